//! Command-line interface for the `iniedit` tool
//!
//! Supports:
//! - Reading single values, key lists and section lists
//! - Setting values in place, creating the file on request
//! - Dumping the resolved document as text or JSON
//! - Showing the token stream of a file
//! - Printing and saving the effective configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ToolConfig;
use crate::ini::{tokenize, Comparison, DocumentOptions, IniDocument, TextEncoding, TokenKind};

/// Read and edit INI files without disturbing their layout
#[derive(Parser, Debug)]
#[command(
    name = "iniedit",
    version,
    about = "Read and edit INI files without disturbing their layout"
)]
pub struct CliArgs {
    /// Compare section and key names case-sensitively
    #[arg(long, global = true, conflicts_with = "ignore_case")]
    pub case_sensitive: bool,

    /// Compare section and key names ignoring case
    #[arg(long, global = true)]
    pub ignore_case: bool,

    /// Decode and encode backslash escapes in values
    #[arg(long, global = true, conflicts_with = "no_escapes")]
    pub escapes: bool,

    /// Keep backslashes in values as written
    #[arg(long, global = true)]
    pub no_escapes: bool,

    /// Encoding for files without a byte-order mark (e.g., utf-16le)
    #[arg(long, global = true, value_name = "ENCODING")]
    pub encoding: Option<TextEncoding>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the value of a key
    Get {
        file: PathBuf,
        /// Section name; `-` or empty for the global section
        section: String,
        key: String,
        /// Printed when the key is missing instead of failing
        #[arg(long)]
        default: Option<String>,
    },
    /// Set the value of a key and save the file
    Set {
        file: PathBuf,
        /// Section name; `-` or empty for the global section
        section: String,
        key: String,
        value: String,
        /// Create the file if it does not exist
        #[arg(long, default_value_t = false)]
        create: bool,
        /// Save the file in this encoding instead of the one it was loaded with
        #[arg(long, value_name = "ENCODING")]
        convert: Option<TextEncoding>,
    },
    /// List the keys of a section
    Keys {
        file: PathBuf,
        /// Section name; `-` or empty for the global section
        section: String,
    },
    /// List the sections of a file
    Sections { file: PathBuf },
    /// Print every section with the last value of each key
    Dump {
        file: PathBuf,
        /// Print JSON instead of INI
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the token stream of a file
    Tokens { file: PathBuf },
    /// Print the effective configuration
    Config {
        /// Save it as the new defaults
        #[arg(long, default_value_t = false)]
        write: bool,
    },
}

impl CliArgs {
    /// The config with command-line flags applied on top
    pub fn effective_config(&self, config: &ToolConfig) -> ToolConfig {
        let mut config = config.clone();
        if self.case_sensitive {
            config.comparison = Comparison::CaseSensitive;
        } else if self.ignore_case {
            config.comparison = Comparison::IgnoreCase;
        }
        if self.escapes {
            config.allow_escapes = true;
        } else if self.no_escapes {
            config.allow_escapes = false;
        }
        if self.encoding.is_some() {
            config.encoding = self.encoding;
        }
        config
    }

    /// Document options from the config, overridden by command-line flags
    pub fn options(&self, config: &ToolConfig) -> DocumentOptions {
        self.effective_config(config).document_options()
    }
}

/// Map a section argument to a document section, `-` and "" meaning global
pub fn section_arg(section: &str) -> Option<&str> {
    match section {
        "" | "-" => None,
        name => Some(name),
    }
}

#[derive(Serialize)]
struct SectionDump<'a> {
    name: &'a str,
    entries: Vec<EntryDump<'a>>,
}

#[derive(Serialize)]
struct EntryDump<'a> {
    key: &'a str,
    value: &'a str,
}

/// Run a parsed command, writing its output to `out`
pub fn execute(args: &CliArgs, config: &ToolConfig, out: &mut dyn Write) -> Result<()> {
    let options = args.options(config);

    match &args.command {
        Command::Get {
            file,
            section,
            key,
            default,
        } => {
            let doc = load(file, &options)?;
            match (doc.get(section_arg(section), key), default) {
                (Some(value), _) => writeln!(out, "{}", value)?,
                (None, Some(default)) => writeln!(out, "{}", default)?,
                (None, None) => bail!("{} not found in [{}]", key, section),
            }
        }
        Command::Set {
            file,
            section,
            key,
            value,
            create,
            convert,
        } => {
            let mut doc = if *create {
                IniDocument::load_or_create(file, &options)
                    .with_context(|| format!("Failed to open {}", file.display()))?
            } else {
                load(file, &options)?
            };
            doc.set_value(section_arg(section), key, value)?;
            let converting = convert.is_some_and(|encoding| encoding != doc.encoding());
            if doc.is_modified() || converting {
                doc.save(*convert)
                    .with_context(|| format!("Failed to save {}", file.display()))?;
            } else {
                tracing::debug!("Value unchanged, not saving {}", file.display());
            }
        }
        Command::Keys { file, section } => {
            let doc = load(file, &options)?;
            for key in doc.keys(section_arg(section)) {
                writeln!(out, "{}", key)?;
            }
        }
        Command::Sections { file } => {
            let doc = load(file, &options)?;
            for section in doc.sections() {
                writeln!(out, "{}", section)?;
            }
        }
        Command::Dump { file, json } => {
            let doc = load(file, &options)?;
            let dump = dump_sections(&doc);
            if *json {
                serde_json::to_writer_pretty(&mut *out, &dump)?;
                writeln!(out)?;
            } else {
                write_dump(&dump, out)?;
            }
        }
        Command::Tokens { file } => {
            let doc = load(file, &options)?;
            let text = doc.text();
            for token in tokenize(&text) {
                writeln!(
                    out,
                    "{:>6} {:>4}  {:<10} {:?}",
                    token.span.start,
                    token.span.len,
                    token_label(&token.kind),
                    token.raw
                )?;
            }
        }
        Command::Config { write } => {
            let effective = args.effective_config(config);
            if *write {
                effective.save().map_err(anyhow::Error::msg)?;
            }
            write!(out, "{}", serde_yaml::to_string(&effective)?)?;
        }
    }
    Ok(())
}

fn load(file: &Path, options: &DocumentOptions) -> Result<IniDocument> {
    IniDocument::load(file, options).with_context(|| format!("Failed to open {}", file.display()))
}

fn dump_sections(doc: &IniDocument) -> Vec<SectionDump<'_>> {
    doc.sections()
        .into_iter()
        .map(|name| {
            let section = Some(name);
            SectionDump {
                name,
                entries: doc
                    .keys(section)
                    .into_iter()
                    .map(|key| EntryDump {
                        key,
                        value: doc.get_value(section, key, ""),
                    })
                    .collect(),
            }
        })
        .collect()
}

fn write_dump(dump: &[SectionDump<'_>], out: &mut dyn Write) -> Result<()> {
    for (i, section) in dump.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        if !section.name.is_empty() {
            writeln!(out, "[{}]", section.name)?;
        }
        for entry in &section.entries {
            writeln!(out, "{}={}", entry.key, entry.value)?;
        }
    }
    Ok(())
}

fn token_label(kind: &TokenKind<'_>) -> &'static str {
    match kind {
        TokenKind::Comment { .. } => "comment",
        TokenKind::Section { .. } => "section",
        TokenKind::Entry { .. } => "entry",
        TokenKind::Undefined => "undefined",
        TokenKind::LineBreak => "linebreak",
        TokenKind::Whitespace => "whitespace",
    }
}
