use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use walkdir::WalkDir;

use datview::schema::{
    JsonSchemaStore, RowStats, SchemaProvider, TableSchema, schema_name_from_path, suggest_headers,
};
use datview::sinks::stream_into;
use datview::{CsvSink, DatFile, DecodeOptions, Error, decode_table};

#[derive(Parser)]
#[command(
    name = "datv",
    version,
    about = "Inspect and batch decode fixed-stride dat tables to CSV/TSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one or more inputs against a schema store.
    Decode(Box<DecodeArgs>),
    /// Inspect table geometry and optionally propose a schema.
    Inspect(InspectArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    Csv,
    Tsv,
}

#[derive(Parser, Clone)]
struct DecodeArgs {
    /// Input files or directories (recurses directories).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Schema store: a JSON array of table schemas.
    #[arg(long)]
    schemas: PathBuf,

    /// Output directory (computed file names).
    #[arg(long, conflicts_with = "out")]
    out_dir: Option<PathBuf>,

    /// Output file (only valid with a single input).
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Sink kind: csv or tsv.
    #[arg(long, value_enum, default_value_t = SinkKind::Csv)]
    sink: SinkKind,

    /// Write header row.
    #[arg(long = "headers", action = ArgAction::SetTrue, default_value_t = true)]
    headers: bool,
    /// Disable header row.
    #[arg(long = "no-headers", action = ArgAction::SetFalse, overrides_with = "headers")]
    _no_headers: bool,

    /// Limit to at most N rows.
    #[arg(long = "max-rows")]
    max_rows: Option<u32>,

    /// Project a subset of columns by name (comma-separated).
    #[arg(long = "columns", value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Drop headers that do not fit the observed stride instead of failing.
    #[arg(long)]
    partial: bool,

    /// Decode columns on the rayon pool.
    #[arg(long)]
    parallel_columns: bool,

    /// Number of concurrent worker threads.
    #[arg(long)]
    jobs: Option<usize>,

    /// Stop on first error.
    #[arg(long)]
    fail_fast: bool,

    /// Append warnings and errors to this log file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Parser, Clone)]
struct InspectArgs {
    input: PathBuf,
    /// Propose a candidate header set from row statistics.
    #[arg(long)]
    infer: bool,
    /// Emit JSON instead of human readable output.
    #[arg(long)]
    json: bool,
}

type AnyError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Decode(args) => run_decode(&args),
        Command::Inspect(args) => run_inspect(&args),
    }
}

fn run_decode(args: &DecodeArgs) -> Result<(), AnyError> {
    if let Some(jobs) = args.jobs {
        // Best-effort: configure global rayon pool once. Ignore error if already set.
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global();
    }
    if let Some(path) = &args.log_file {
        datview::logger::set_log_file(path)?;
    }

    let store = JsonSchemaStore::from_path(&args.schemas)?;
    let files = discover_inputs(&args.inputs);

    if args.out.is_some() && files.len() != 1 {
        return Err("--out requires a single input".into());
    }

    let mut tasks: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
    if let Some(out) = &args.out {
        tasks.push((files[0].clone(), out.clone()));
    } else {
        for input in files {
            let output = compute_output_path(&input, args);
            tasks.push((input, output));
        }
    }

    let process = |(input, output): (PathBuf, PathBuf)| -> Result<(), AnyError> {
        decode_one(&input, &output, &store, args)
    };

    if args.fail_fast {
        tasks
            .into_par_iter()
            .map(process)
            .collect::<Result<Vec<_>, _>>()?;
    } else {
        let results = tasks
            .into_par_iter()
            .map(|task| {
                let result = process(task);
                if let Err(err) = &result {
                    datview::logger::log_error(&format!("{err}"));
                }
                result
            })
            .collect::<Vec<_>>();
        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            eprintln!("completed with {failures} failures");
        }
    }

    Ok(())
}

fn decode_one(
    input: &Path,
    output: &Path,
    store: &JsonSchemaStore,
    args: &DecodeArgs,
) -> Result<(), AnyError> {
    let name = schema_name_from_path(&input.file_name().unwrap_or_default().to_string_lossy())
        .to_owned();
    let schema = store
        .find_headers_by_name(&name)
        .ok_or_else(|| Error::SchemaNotFound { name: name.clone() })?;

    let bytes = std::fs::read(input)?;
    let file = DatFile::parse(&bytes)?;

    let mut options = DecodeOptions::new();
    if args.partial {
        options = options.with_partial_headers();
    }
    if args.parallel_columns {
        options = options.with_parallel_columns();
    }
    if let Some(limit) = args.max_rows {
        options = options.with_max_rows(limit);
    }
    if let Some(columns) = &args.columns {
        options = options.with_columns(columns.clone());
    }

    let table = decode_table(&file, schema, &options)?;

    let delimiter = match args.sink {
        SinkKind::Csv => b',',
        SinkKind::Tsv => b'\t',
    };
    let out_file = File::create(output)?;
    let mut sink = CsvSink::new(out_file)
        .with_delimiter(delimiter)
        .with_headers(args.headers);
    stream_into(&table.headers, &table.rows, &mut sink)?;
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> Result<(), AnyError> {
    let bytes = std::fs::read(&args.input)?;
    let file = DatFile::parse(&bytes)?;

    let suggested: Option<TableSchema> = if args.infer {
        let stats = RowStats::gather(file.view(), file.heap());
        let name = schema_name_from_path(
            &args.input.file_name().unwrap_or_default().to_string_lossy(),
        )
        .to_owned();
        Some(TableSchema::new(name, suggest_headers(&stats)))
    } else {
        None
    };

    if args.json {
        #[derive(serde::Serialize)]
        struct InspectJson {
            row_count: u32,
            stride: u32,
            heap_length: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            suggested_schema: Option<TableSchema>,
        }
        let payload = InspectJson {
            row_count: file.row_count(),
            stride: file.stride(),
            heap_length: file.heap().len(),
            suggested_schema: suggested,
        };
        serde_json::to_writer_pretty(std::io::stdout(), &payload)?;
        println!();
    } else {
        println!(
            "Rows: {}  Stride: {}  Heap: {} bytes",
            file.row_count(),
            file.stride(),
            file.heap().len()
        );
        if let Some(schema) = suggested {
            for (index, header) in schema.headers.iter().enumerate() {
                println!(
                    "[{index:>3}] offset={offset:<4}  {ty:?}",
                    offset = header.offset,
                    ty = header.ty
                );
            }
        }
    }
    Ok(())
}

fn discover_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let Ok(entry) = entry else { continue };
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
                if name.ends_with(".dat") || name.ends_with(".dat64") {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn compute_output_path(input: &Path, args: &DecodeArgs) -> PathBuf {
    let extension = match args.sink {
        SinkKind::Csv => "csv",
        SinkKind::Tsv => "tsv",
    };
    let file_name = input.with_extension(extension);
    args.out_dir.as_ref().map_or(file_name.clone(), |dir| {
        dir.join(file_name.file_name().unwrap_or_default())
    })
}
