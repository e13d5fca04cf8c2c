//! Batch converter from Lua table-constructor files to JSON.

use clap::Parser;
use luatable::{decode, to_json_value, JsonConversionOptions, DEFAULT_MAX_DEPTH};
use serde_json::{to_writer, to_writer_pretty};
use std::{
    fs::{create_dir_all, read, File},
    io::{stdout, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Default maximum Lua file size limit.
///
/// 64 MiB is enough for anyone. 🙃
const DEFAULT_SIZE_LIMIT: u64 = 64 * 1024 * 1024;

type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Converts Lua table-constructor files into JSON.
///
/// Each input file must contain a single Lua literal expression, optionally
/// surrounded by whitespace and comments.
#[derive(Parser, Debug)]
#[command(name = "lua2json", version, about, long_about = None, verbatim_doc_comment, rename_all = "snake_case")]
struct Args {
    /// Input Lua filename, or a directory whose `.lua` files (including in
    /// subdirectories) are all converted. Each file is loaded entirely into
    /// memory.
    #[arg()]
    input: PathBuf,

    /// Output JSON filename (single-file mode) or directory; if omitted,
    /// single-file output goes to stdout and directory output lands next to
    /// each input file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(short, long)]
    pretty: bool,

    /// Maximum table depth. Increasing this risks crashing with a stack
    /// overflow.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, id = "DEPTH")]
    max_depth: u16,

    /// Maximum Lua file size to process.
    #[arg(long, default_value_t = DEFAULT_SIZE_LIMIT, id = "BYTES")]
    size_limit: u64,

    /// Use lossy string conversion, rather than erroring on non-UTF-8
    /// strings.
    #[arg(long)]
    lossy_string: bool,
}

fn main() -> Result {
    let args = Args::parse();

    if args.input.is_dir() {
        convert_dir(&args)
    } else {
        let out: Box<dyn Write> = match &args.output {
            Some(path) => Box::new(File::options().create_new(true).write(true).open(path)?),
            None => Box::new(stdout()),
        };
        convert_file(&args.input, out, &args)?;
        if args.output.is_none() {
            println!();
        }
        Ok(())
    }
}

/// Converts every `.lua` file under the input directory, descending into
/// subdirectories and continuing past per-file failures.
fn convert_dir(args: &Args) -> Result {
    let out_dir = args.output.as_deref().unwrap_or(&args.input);
    let mut failures = 0u32;
    convert_dir_entries(&args.input, out_dir, args, &mut failures)?;

    if failures > 0 {
        return Err(format!("{failures} file(s) failed to convert").into());
    }
    Ok(())
}

/// Walks one directory level, mirroring subdirectories under `out_dir`.
fn convert_dir_entries(dir: &Path, out_dir: &Path, args: &Args, failures: &mut u32) -> Result {
    for entry in dir.read_dir()? {
        let path = entry?.path();
        let name = path.file_name().unwrap_or_default();

        if path.is_dir() {
            convert_dir_entries(&path, &out_dir.join(name), args, failures)?;
            continue;
        }
        if path.extension().map_or(true, |ext| ext != "lua") {
            continue;
        }

        let out_path = out_dir.join(Path::new(name).with_extension("json"));
        let result = create_dir_all(out_dir)
            .and_then(|()| File::options().create_new(true).write(true).open(&out_path))
            .map_err(Into::into)
            .and_then(|f| convert_file(&path, Box::new(f), args));

        match result {
            Ok(()) => eprintln!("converted {} -> {}", path.display(), out_path.display()),
            Err(e) => {
                *failures += 1;
                eprintln!("failed to convert {}: {e}", path.display());
            }
        }
    }
    Ok(())
}

fn convert_file(input: &Path, out: Box<dyn Write>, args: &Args) -> Result {
    let metadata = std::fs::metadata(input)?;
    if metadata.len() > args.size_limit {
        return Err(format!(
            "maximum file size exceeded ({} > {})",
            metadata.len(),
            args.size_limit
        )
        .into());
    }

    let buf = read(input)?;
    let lua_value = decode(&buf, args.max_depth)?;

    let opts = JsonConversionOptions {
        lossy_string: args.lossy_string,
    };
    let json_value = to_json_value(lua_value, &opts)?;

    let out = BufWriter::new(out);
    if args.pretty {
        to_writer_pretty(out, &json_value)?;
    } else {
        to_writer(out, &json_value)?;
    }
    Ok(())
}
