//! foliodump - Dump document structure
//!
//! Prints the token stream, the object table or the trailers of a document
//! in an XML-like layout, or writes its streams out as separate files.

use anyhow::{Context, Result as AnyResult};
use clap::{ArgGroup, Parser};
use folio_core::error::Result;
use folio_core::{DanglingPolicy, ObjKey, PDFDocument, PDFObject, ParseOptions, lex};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Escape special characters for XML output.
fn escape(s: &[u8]) -> String {
    let mut result = String::new();
    for &byte in s {
        match byte {
            b'&' => result.push_str("&amp;"),
            b'<' => result.push_str("&lt;"),
            b'>' => result.push_str("&gt;"),
            b'"' => result.push_str("&quot;"),
            b'\'' => result.push_str("&#39;"),
            0..=31 | 127..=255 => result.push_str(&format!("&#{byte};")),
            _ => result.push(byte as char),
        }
    }
    result
}

/// How stream bodies are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamCodec {
    /// Attributes only.
    None,
    /// Undecoded bytes.
    Raw,
    /// Decoded bytes.
    Binary,
    /// Attributes plus escaped decoded data.
    Text,
}

/// Dump one value.
fn dumpxml<W: Write>(out: &mut W, obj: &PDFObject, codec: StreamCodec) -> Result<()> {
    match obj {
        PDFObject::Null => write!(out, "<null />")?,
        PDFObject::Bool(b) => write!(out, "<boolean>{b}</boolean>")?,
        PDFObject::Int(n) => write!(out, "<number>{n}</number>")?,
        PDFObject::Real(n) => write!(out, "<number>{n}</number>")?,
        PDFObject::String(s) => {
            write!(out, r#"<string size="{}">{}</string>"#, s.len(), escape(s))?;
        }
        PDFObject::Array(arr) => {
            writeln!(out, r#"<list size="{}">"#, arr.len())?;
            for item in arr {
                dumpxml(out, item, codec)?;
                writeln!(out)?;
            }
            write!(out, "</list>")?;
        }
        PDFObject::Dict(dict) => {
            writeln!(out, r#"<dict size="{}">"#, dict.len())?;
            let mut keys: Vec<&String> = dict.keys().collect();
            keys.sort();
            for key in keys {
                writeln!(out, "<key>{}</key>", escape(key.as_bytes()))?;
                write!(out, "<value>")?;
                dumpxml(out, &dict[key], codec)?;
                writeln!(out, "</value>")?;
            }
            write!(out, "</dict>")?;
        }
        PDFObject::Stream(stream) => match codec {
            StreamCodec::Raw => out.write_all(stream.rawdata())?,
            StreamCodec::Binary => out.write_all(&stream.decode()?)?,
            StreamCodec::Text | StreamCodec::None => {
                writeln!(out, "<stream>")?;
                writeln!(out, "<props>")?;
                dumpxml(out, &PDFObject::Dict(stream.attrs.clone()), codec)?;
                writeln!(out)?;
                writeln!(out, "</props>")?;
                if codec == StreamCodec::Text {
                    let data = stream.decode()?;
                    writeln!(out, r#"<data size="{}">{}</data>"#, data.len(), escape(&data))?;
                }
                write!(out, "</stream>")?;
            }
        },
        PDFObject::Ref(objref) => {
            write!(out, r#"<ref id="{}" gen="{}" />"#, objref.objid, objref.genno)?;
        }
    }
    Ok(())
}

fn dumptrailers<W: Write>(out: &mut W, doc: &PDFDocument) -> Result<()> {
    if doc.trailers().is_empty() {
        warn!("document has no trailer");
    }
    for trailer in doc.trailers() {
        writeln!(out, "<trailer>")?;
        dumpxml(out, &PDFObject::Dict(trailer.clone()), StreamCodec::None)?;
        writeln!(out)?;
        writeln!(out, "</trailer>")?;
        writeln!(out)?;
    }
    Ok(())
}

fn dumpobj<W: Write>(out: &mut W, key: ObjKey, obj: &PDFObject, codec: StreamCodec) -> Result<()> {
    writeln!(out, r#"<object id="{}" gen="{}">"#, key.objid, key.genno)?;
    dumpxml(out, obj, codec)?;
    writeln!(out)?;
    writeln!(out, "</object>")?;
    writeln!(out)?;
    Ok(())
}

/// Every object in key order, then the trailers.
fn dumpallobjs<W: Write>(out: &mut W, doc: &PDFDocument, codec: StreamCodec) -> Result<()> {
    write!(out, "<pdf>")?;
    for key in doc.objects() {
        let obj = doc.getobj(key.objid, key.genno)?;
        dumpobj(out, key, &obj, codec)?;
    }
    dumptrailers(out, doc)?;
    write!(out, "</pdf>")?;
    Ok(())
}

fn dumppages<W: Write>(out: &mut W, doc: &PDFDocument) -> Result<()> {
    writeln!(out, "<pages>")?;
    for (index, page) in doc.pages()?.iter().enumerate() {
        match page.pageid {
            Some(key) => writeln!(
                out,
                r#"<page number="{}" id="{}" gen="{}" />"#,
                index + 1,
                key.objid,
                key.genno
            )?,
            None => writeln!(out, r#"<page number="{}" />"#, index + 1)?,
        }
    }
    writeln!(out, "</pages>")?;
    Ok(())
}

/// One line per token: byte offset, then the token.
fn dumptokens<W: Write>(out: &mut W, data: &[u8]) -> Result<()> {
    let lexed = lex(data);
    for (pos, token) in &lexed.tokens {
        writeln!(out, "{pos:>8} {token}")?;
    }
    match lexed.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Write each stream to `stream_<objid>.dat` under `dir`.
fn extractstreams(doc: &PDFDocument, dir: &Path, raw: bool) -> Result<usize> {
    fs::create_dir_all(dir)?;
    let mut count = 0;
    for key in doc.objects() {
        let obj = doc.getobj(key.objid, key.genno)?;
        let PDFObject::Stream(stream) = obj.as_ref() else {
            continue;
        };
        let path = dir.join(format!("stream_{:04}.dat", key.objid));
        if path.exists() {
            warn!(path = %path.display(), "file exists, skipping");
            continue;
        }
        let data = if raw {
            stream.rawdata().to_vec()
        } else {
            stream.decode()?
        };
        debug!(path = %path.display(), bytes = data.len(), "extracting stream");
        fs::write(&path, data)?;
        count += 1;
    }
    Ok(count)
}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "foliodump")]
#[command(about = "Dump the tokens, objects and trailers of a document")]
#[command(version)]
#[command(group(ArgGroup::new("codec").args(["raw_stream", "binary_stream", "text_stream"])))]
struct Args {
    /// One or more paths to input files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the token stream instead of parsing the document
    #[arg(long)]
    tokens: bool,

    /// Comma-separated object ids to dump (generation 0)
    #[arg(short = 'i', long, value_delimiter = ',')]
    objects: Vec<u64>,

    /// Dump every object and all trailers
    #[arg(short = 'a', long)]
    all: bool,

    /// List the pages in document order
    #[arg(short = 'p', long)]
    pages: bool,

    /// Write every stream to a file in this directory
    #[arg(short = 'E', long)]
    extract_dir: Option<PathBuf>,

    /// Write stream objects without decoding them
    #[arg(short = 'r', long)]
    raw_stream: bool,

    /// Write stream objects as decoded binary data
    #[arg(short = 'b', long)]
    binary_stream: bool,

    /// Write stream objects with their decoded data as text
    #[arg(short = 't', long)]
    text_stream: bool,

    /// Resolve references to missing objects as null instead of failing
    #[arg(long)]
    null_dangling: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Write debug logging to stderr
    #[arg(short = 'd', long)]
    debug: bool,
}

impl Args {
    fn codec(&self) -> StreamCodec {
        if self.raw_stream {
            StreamCodec::Raw
        } else if self.binary_stream {
            StreamCodec::Binary
        } else if self.text_stream {
            StreamCodec::Text
        } else {
            StreamCodec::None
        }
    }

    fn parse_options(&self) -> ParseOptions {
        if self.null_dangling {
            ParseOptions::default().with_dangling(DanglingPolicy::Null)
        } else {
            ParseOptions::default()
        }
    }
}

fn process_file<W: Write>(path: &Path, out: &mut W, args: &Args) -> AnyResult<()> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    // SAFETY: the file is opened read-only and is not modified while mapped.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("cannot map {}", path.display()))?;

    if args.tokens {
        dumptokens(out, &mmap)?;
        return Ok(());
    }

    let doc = PDFDocument::parse(&mmap, &args.parse_options())?;
    let codec = args.codec();

    if let Some(dir) = &args.extract_dir {
        let count = extractstreams(&doc, dir, args.raw_stream)?;
        eprintln!("extracted {count} streams to {}", dir.display());
        return Ok(());
    }

    if args.all {
        dumpallobjs(out, &doc, codec)?;
    } else if !args.objects.is_empty() {
        for &objid in &args.objects {
            let obj = doc.getobj(objid, 0)?;
            dumpobj(out, ObjKey::new(objid, 0), &obj, codec)?;
        }
    } else if args.pages {
        dumppages(out, &doc)?;
    } else {
        dumptrailers(out, &doc)?;
    }
    Ok(())
}

fn main() -> AnyResult<()> {
    let args = Args::parse();
    let default = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("cannot create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    for path in &args.files {
        process_file(path, &mut output, &args)
            .with_context(|| format!("error processing {}", path.display()))?;
    }
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(obj: &PDFObject, codec: StreamCodec) -> String {
        let mut out = Vec::new();
        dumpxml(&mut out, obj, codec).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(b"a<b>&\"\n"), "a&lt;b&gt;&amp;&quot;&#10;");
    }

    #[test]
    fn test_dump_scalars_and_arrays() {
        let obj = PDFObject::Array(vec![
            PDFObject::Int(1),
            PDFObject::Bool(true),
            PDFObject::Null,
        ]);
        assert_eq!(
            render(&obj, StreamCodec::None),
            "<list size=\"3\">\n<number>1</number>\n<boolean>true</boolean>\n<null />\n</list>"
        );
    }

    #[test]
    fn test_dump_tokens() {
        let mut out = Vec::new();
        dumptokens(&mut out, b"1 /A").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "       0 Int 1\n       2 Name \"A\"\n");
    }

    #[test]
    fn test_dump_tokens_reports_lex_error() {
        let mut out = Vec::new();
        assert!(dumptokens(&mut out, b"1 @").is_err());
        assert_eq!(String::from_utf8(out).unwrap(), "       0 Int 1\n");
    }

    #[test]
    fn test_codec_flags_are_exclusive() {
        assert!(Args::try_parse_from(["foliodump", "-r", "-b", "a.pdf"]).is_err());
        let args = Args::try_parse_from(["foliodump", "-t", "a.pdf"]).unwrap();
        assert_eq!(args.codec(), StreamCodec::Text);
    }

    #[test]
    fn test_object_ids_are_comma_separated() {
        let args = Args::try_parse_from(["foliodump", "-i", "1,4,7", "a.pdf"]).unwrap();
        assert_eq!(args.objects, vec![1, 4, 7]);
    }
}
