//! The `seqgen` verb: synthesises an integer sequence of records.
//!
//! This is the canonical input-ignoring verb: it receives only the
//! end-of-stream envelope and emits its generated records ahead of it.

use crate::error::{StreamError, StreamResult};
use crate::processing::{
    take_option_value, usage_error, EnvelopeSender, RecordTransformer, VerbSetup,
};
use crate::types::{Envelope, Record, Value};

const SEQGEN_VERB: &str = "seqgen";

const SEQGEN_USAGE: &str = "\
Usage: seqgen [options]
Produces a sequence of records with a single integer-valued field. Reads
no input; place it at the head of a verb chain.
Options:
-f {name}   Field name for the counter (default: i).
--start {n} First value (default: 1).
--stop {n}  Last value, inclusive (default: 100).
--step {n}  Increment (default: 1). May be negative; zero is allowed only
            when start equals stop.
-h, --help  Print this message.
";

/// Registration for the `seqgen` verb.
pub const SEQGEN_SETUP: VerbSetup = VerbSetup {
    name: SEQGEN_VERB,
    usage: SEQGEN_USAGE,
    ignores_input: true,
    parse: parse_seqgen,
};

fn parse_seqgen(args: &[String], cursor: &mut usize) -> StreamResult<Box<dyn RecordTransformer>> {
    let mut field_name = "i".to_string();
    let mut start = 1i64;
    let mut stop = 100i64;
    let mut step = 1i64;

    while let Some(arg) = args.get(*cursor) {
        if !arg.starts_with('-') {
            break;
        }
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(StreamError::Help {
                    usage: SEQGEN_USAGE.to_string(),
                })
            }
            "-f" => field_name = take_option_value(SEQGEN_VERB, "-f", args, cursor)?,
            "--start" => start = take_int_value(args, cursor, "--start")?,
            "--stop" => stop = take_int_value(args, cursor, "--stop")?,
            "--step" => step = take_int_value(args, cursor, "--step")?,
            other => {
                return Err(usage_error(
                    SEQGEN_VERB,
                    format!("unrecognized option '{other}'"),
                ))
            }
        }
    }

    Ok(Box::new(SeqgenTransformer::new(field_name, start, stop, step)?))
}

fn take_int_value(args: &[String], cursor: &mut usize, flag: &str) -> StreamResult<i64> {
    let raw = take_option_value(SEQGEN_VERB, flag, args, cursor)?;
    raw.parse::<i64>()
        .map_err(|_| usage_error(SEQGEN_VERB, format!("option {flag} wants an integer, got '{raw}'")))
}

/// Record-synthesising transformer: emits `{field: start}`,
/// `{field: start+step}`, ... up to `stop` inclusive, all ahead of the
/// forwarded end-of-stream marker.
#[derive(Debug)]
pub struct SeqgenTransformer {
    field_name: String,
    start: i64,
    stop: i64,
    step: i64,
}

impl SeqgenTransformer {
    /// A step of zero is accepted only when `start == stop` (a single
    /// record); otherwise the sequence would never terminate.
    pub fn new(
        field_name: impl Into<String>,
        start: i64,
        stop: i64,
        step: i64,
    ) -> StreamResult<Self> {
        if step == 0 && start != stop {
            return Err(usage_error(
                SEQGEN_VERB,
                "step of 0 requires start to equal stop",
            ));
        }
        Ok(Self {
            field_name: field_name.into(),
            start,
            stop,
            step,
        })
    }
}

impl RecordTransformer for SeqgenTransformer {
    fn transform(&mut self, envelope: Envelope, output: &EnvelopeSender) {
        if !envelope.end_of_stream {
            // ignores_input: data envelopes are not expected here.
            return;
        }

        let mut context = envelope.context.clone();
        let mut n = self.start;
        loop {
            let in_range = if self.step >= 0 {
                n <= self.stop
            } else {
                n >= self.stop
            };
            if !in_range {
                break;
            }

            context.bump_record();
            let mut record = Record::new();
            record.put(self.field_name.as_str(), Value::from_int(n));
            let _ = output.send(Envelope::record(record, context.clone()));

            if self.step == 0 {
                break;
            }
            match n.checked_add(self.step) {
                Some(next) => n = next,
                None => break,
            }
        }

        let _ = output.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::SeqgenTransformer;
    use crate::processing::RecordTransformer;
    use crate::types::{Context, Envelope};

    fn run(verb: &mut SeqgenTransformer) -> Vec<Envelope> {
        let (tx, rx) = crossbeam_channel::unbounded();
        verb.transform(Envelope::end_of_stream(Context::default()), &tx);
        rx.try_iter().collect()
    }

    fn values(envs: &[Envelope], field: &str) -> Vec<i64> {
        envs.iter()
            .filter(|e| !e.end_of_stream)
            .map(|e| e.record.get(field).unwrap().int_value())
            .collect()
    }

    #[test]
    fn ascending_sequence_then_end_of_stream() {
        let mut verb = SeqgenTransformer::new("i", 1, 4, 1).unwrap();
        let envs = run(&mut verb);
        assert_eq!(values(&envs, "i"), vec![1, 2, 3, 4]);
        assert!(envs.last().unwrap().end_of_stream);
    }

    #[test]
    fn descending_sequence() {
        let mut verb = SeqgenTransformer::new("n", 3, 1, -1).unwrap();
        let envs = run(&mut verb);
        assert_eq!(values(&envs, "n"), vec![3, 2, 1]);
    }

    #[test]
    fn empty_range_emits_only_the_marker() {
        let mut verb = SeqgenTransformer::new("i", 5, 1, 1).unwrap();
        let envs = run(&mut verb);
        assert_eq!(envs.len(), 1);
        assert!(envs[0].end_of_stream);
    }

    #[test]
    fn zero_step_single_value() {
        let mut verb = SeqgenTransformer::new("i", 7, 7, 0).unwrap();
        let envs = run(&mut verb);
        assert_eq!(values(&envs, "i"), vec![7]);
    }

    #[test]
    fn zero_step_over_a_range_is_rejected() {
        assert!(SeqgenTransformer::new("i", 1, 5, 0).is_err());
    }

    #[test]
    fn generated_records_carry_counters() {
        let mut verb = SeqgenTransformer::new("i", 1, 3, 1).unwrap();
        let envs = run(&mut verb);
        let nrs: Vec<u64> = envs
            .iter()
            .filter(|e| !e.end_of_stream)
            .map(|e| e.context.nr)
            .collect();
        assert_eq!(nrs, vec![1, 2, 3]);
    }

    #[test]
    fn data_envelopes_are_ignored() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = SeqgenTransformer::new("i", 1, 2, 1).unwrap();
        verb.transform(
            Envelope::record(crate::types::Record::new(), Context::default()),
            &tx,
        );
        assert!(rx.try_recv().is_err());
    }
}
