use std::fs;
use std::path::{Path, PathBuf};

use batch_adapters::fields::{name_writer, person_reader};
use batch_adapters::{TimestampedOutputListener, TitleFilterProcessor};
use batch_core::constants::OUTPUT_PATH_KEY;
use batch_core::event::InMemoryEventStore;
use batch_core::repo::InMemoryExecutionRepository;
use batch_core::{BatchError, ExecutionContext, FaultPolicy, JobDriver, RecordReader, RecordWriter, RunParameters,
                 RunStatus};

const HEADER: &str = "person_ID,name,first,last,middle,email,phone,fax,title\n";

fn job(input: PathBuf, base: &Path, chunk_size: usize) -> JobDriver<InMemoryEventStore, InMemoryExecutionRepository> {
    JobDriver::new().steps(move |_ctx: &ExecutionContext| Ok(Box::new(person_reader(&input)) as Box<dyn RecordReader>),
                           TitleFilterProcessor::new("Professor"),
                           |ctx: &ExecutionContext| {
                               let path = ctx.require_str(OUTPUT_PATH_KEY)?;
                               Ok(Box::new(name_writer(path)) as Box<dyn RecordWriter>)
                           })
                    .name("importUserJob")
                    .chunk_size(chunk_size)
                    .listener(TimestampedOutputListener::new(base.to_string_lossy()))
                    .build()
}

fn output_of(rec: &batch_core::ExecutionRecord) -> String {
    fs::read_to_string(rec.context.get_str(OUTPUT_PATH_KEY).unwrap()).unwrap()
}

#[test]
fn professor_rows_are_dropped_from_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    fs::write(&input,
              format!("{HEADER}1,John Smith,John,Smith,,js@x.org,555,,Professor\n\
                       2,Ann Lee,Ann,Lee,,al@x.org,555,,Manager\n")).unwrap();

    let mut job = job(input, &dir.path().join("out"), 3);
    let rec = job.run(RunParameters::new().with("timestamp", 1)).unwrap();

    assert_eq!(rec.status, RunStatus::Completed);
    assert_eq!(rec.chunk_count, 1);
    assert_eq!(rec.write_count, 1);
    let path = rec.context.get_str(OUTPUT_PATH_KEY).unwrap();
    assert!(path.ends_with(".csv"));
    assert!(path.contains("out_"));
    assert_eq!(output_of(&rec), "Ann,Lee\n");
}

#[test]
fn empty_input_produces_empty_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    fs::write(&input, HEADER).unwrap();

    let mut job = job(input, &dir.path().join("out"), 3);
    let rec = job.run(RunParameters::new().with("timestamp", 1)).unwrap();
    assert_eq!(rec.status, RunStatus::Completed);
    assert_eq!(rec.chunk_count, 0);
    assert_eq!(output_of(&rec), "");
}

#[test]
fn malformed_line_fails_by_default_and_is_skipped_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    fs::write(&input,
              format!("{HEADER}1,A B,A,B,,a@x,1,,Dean\n2,broken\n3,C D,C,D,,c@x,1,,Clerk\n")).unwrap();

    let mut strict = job(input.clone(), &dir.path().join("strict"), 3);
    let rec = strict.run(RunParameters::new().with("timestamp", 1)).unwrap();
    assert_eq!(rec.status, RunStatus::Failed);
    assert_eq!(rec.failure.unwrap().error,
               BatchError::MalformedRecord { line: 3,
                                             expected: 9,
                                             found: 2 });

    let mut lenient = JobDriver::new().steps(move |_ctx: &ExecutionContext| {
                                                 Ok(Box::new(person_reader(&input)) as Box<dyn RecordReader>)
                                             },
                                             TitleFilterProcessor::new("Professor"),
                                             |ctx: &ExecutionContext| {
                                                 Ok(Box::new(name_writer(ctx.require_str(OUTPUT_PATH_KEY)?))
                                                    as Box<dyn RecordWriter>)
                                             })
                                      .on_malformed(FaultPolicy::Skip { limit: None })
                                      .listener(TimestampedOutputListener::new(dir.path()
                                                                                  .join("lenient")
                                                                                  .to_string_lossy()))
                                      .build();
    let rec = lenient.run(RunParameters::new().with("timestamp", 1)).unwrap();
    assert_eq!(rec.status, RunStatus::Completed);
    assert_eq!(rec.skip_count, 1);
    assert_eq!(output_of(&rec), "A,B\nC,D\n");
}

#[test]
fn missing_input_file_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path().join("absent.csv"), &dir.path().join("out"), 3);
    let rec = job.run(RunParameters::new().with("timestamp", 1)).unwrap();
    assert_eq!(rec.status, RunStatus::Failed);
    assert!(matches!(rec.failure.unwrap().error, BatchError::Read(_)));
}

#[test]
fn blank_line_fails_the_run_at_its_physical_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    fs::write(&input,
              format!("{HEADER}1,A B,A,B,,a@x,1,,Dean\n\n3,C D,C,D,,c@x,1,,Clerk\n")).unwrap();

    let mut job = job(input, &dir.path().join("out"), 5);
    let rec = job.run(RunParameters::new().with("timestamp", 1)).unwrap();
    assert_eq!(rec.status, RunStatus::Failed);
    assert_eq!(rec.failure.unwrap().error,
               BatchError::MalformedRecord { line: 3,
                                             expected: 9,
                                             found: 0 });
}
