//! Shared fixtures for the mfac-loader integration tests.
//!
//! [`TestCompiler`] is an in-process stand-in for the external schema
//! compiler. It accepts a small proto-like language and writes generated
//! modules the same way the real compiler would, absolute imports included:
//!
//! ```text
//! import "address.idl";
//! enum Kind { HOME = 0; WORK = 1; }
//! message Person {
//!   string name = 1;
//!   repeated address.Address addresses = 2;
//!   Kind kind = 3;
//! }
//! ```
//!
//! Imports must name a file already present in the schema directory, and
//! anything it cannot parse fails the compilation without writing output.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use mfac_loader::compiler::module_path;
use mfac_loader::{CompileError, SchemaCompiler, Workspace};

/// What the test compiler does after a successful parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Output {
    /// Write a well-formed module.
    #[default]
    Module,
    /// Write a module without the imports marker line.
    WithoutMarker,
    /// Report success without writing anything.
    Nothing,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TestCompiler {
    pub output: Output,
}

impl TestCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(output: Output) -> Self {
        Self { output }
    }
}

impl SchemaCompiler for TestCompiler {
    fn compile(&self, schema: &Path, workspace: &Workspace) -> Result<PathBuf, CompileError> {
        let target = module_path(schema, workspace)?;
        let failed = |stderr: String| CompileError::Failed {
            schema: schema.display().to_string(),
            status: "exit status: 1".to_string(),
            stderr,
        };

        let source = fs::read_to_string(schema).map_err(|e| failed(e.to_string()))?;
        let file = schema
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| failed("schema has no file name".to_string()))?;
        let text = translate(file, &source, workspace.schema_dir(), self.output)
            .map_err(|reason| failed(format!("{file}: {reason}")))?;

        if self.output != Output::Nothing {
            fs::write(&target, text).map_err(|e| failed(e.to_string()))?;
        }
        Ok(target)
    }
}

fn translate(file: &str, source: &str, schema_dir: &Path, output: Output) -> Result<String, String> {
    let tokens = tokenize(source);
    let mut tokens = tokens.iter().map(String::as_str);
    let mut imports = Vec::new();
    let mut body = String::new();

    while let Some(token) = tokens.next() {
        match token {
            "import" => {
                let target = next(&mut tokens)?;
                let target = target
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .ok_or_else(|| format!("expected quoted import, got {target:?}"))?;
                expect(&mut tokens, ";")?;
                if !schema_dir.join(target).is_file() {
                    return Err(format!("{target}: File not found."));
                }
                let stem = target
                    .strip_suffix(".idl")
                    .ok_or_else(|| format!("import {target:?} is not an .idl file"))?;
                imports.push(format!("{stem}_idl"));
            }
            "enum" => {
                let name = identifier(next(&mut tokens)?)?;
                expect(&mut tokens, "{")?;
                body.push_str(&format!("enum {name} {{\n"));
                loop {
                    let value = next(&mut tokens)?;
                    if value == "}" {
                        break;
                    }
                    let value = identifier(value)?;
                    expect(&mut tokens, "=")?;
                    let number = number::<i32>(next(&mut tokens)?)?;
                    expect(&mut tokens, ";")?;
                    body.push_str(&format!("  {value} = {number}\n"));
                }
                body.push_str("}\n");
            }
            "message" => {
                let name = identifier(next(&mut tokens)?)?;
                expect(&mut tokens, "{")?;
                body.push_str(&format!("message {name} {{\n"));
                loop {
                    let first = next(&mut tokens)?;
                    if first == "}" {
                        break;
                    }
                    let (label, type_name) = match first {
                        "repeated" => ("repeated", next(&mut tokens)?),
                        other => ("singular", other),
                    };
                    let type_name = type_reference(type_name)?;
                    let field = identifier(next(&mut tokens)?)?;
                    expect(&mut tokens, "=")?;
                    let number = number::<u32>(next(&mut tokens)?)?;
                    expect(&mut tokens, ";")?;
                    body.push_str(&format!("  {label} {type_name} {field} = {number}\n"));
                }
                body.push_str("}\n");
            }
            other => return Err(format!("unexpected token {other:?}")),
        }
    }

    let mut text = format!("# Generated by the mfac test compiler. DO NOT EDIT!\nmodule \"{file}\"\n");
    if output != Output::WithoutMarker {
        text.push_str("# @@insertion_point(imports)\n");
    }
    for import in imports {
        text.push_str(&format!("import {import}\n"));
    }
    text.push('\n');
    text.push_str(&body);
    Ok(text)
}

fn tokenize(source: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(source.len() * 2);
    for line in source.lines() {
        let code = line.split("//").next().unwrap_or("");
        for c in code.chars() {
            if matches!(c, '{' | '}' | ';' | '=') {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
            } else {
                spaced.push(c);
            }
        }
        spaced.push('\n');
    }
    spaced.split_whitespace().map(str::to_string).collect()
}

fn next<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, String> {
    tokens.next().ok_or_else(|| "unexpected end of file".to_string())
}

fn expect<'a>(tokens: &mut impl Iterator<Item = &'a str>, want: &str) -> Result<(), String> {
    match tokens.next() {
        Some(got) if got == want => Ok(()),
        Some(got) => Err(format!("expected {want:?}, got {got:?}")),
        None => Err(format!("expected {want:?}, got end of file")),
    }
}

fn identifier(token: &str) -> Result<&str, String> {
    let mut chars = token.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(token)
    } else {
        Err(format!("invalid identifier {token:?}"))
    }
}

// `address.Address` names a type from the module generated for address.idl.
fn type_reference(token: &str) -> Result<String, String> {
    match token.split_once('.') {
        Some((stem, name)) => Ok(format!("{}_idl.{}", identifier(stem)?, identifier(name)?)),
        None => identifier(token).map(str::to_string),
    }
}

fn number<T: std::str::FromStr>(token: &str) -> Result<T, String> {
    token
        .parse()
        .map_err(|_| format!("invalid number {token:?}"))
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const ADDRESS: &str = r#"
// A postal address.
message Address {
  string street = 1;
  string city = 2;
  uint32 zip = 3;
}
"#;

pub const PERSON: &str = r#"
import "address.idl";

enum PhoneKind {
  MOBILE = 0;
  HOME = 1;
}

message Phone {
  string number = 1;
  PhoneKind kind = 2;
}

message Person {
  string name = 1;
  int32 id = 2;
  repeated Phone phones = 3;
  address.Address home = 4;
  repeated string tags = 5;
  bytes avatar = 6;
  bool active = 7;
}
"#;

/// A schema the test compiler rejects.
pub const BROKEN: &str = "message Broken {\n  string = ;\n}\n";

/// Write `text` to `<dir>/<name>` and return the path.
pub fn write_schema(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write schema fixture");
    path
}

/// A message schema with one string field per name in `fields`.
pub fn message_schema(name: &str, fields: &[&str]) -> String {
    let mut text = format!("message {name} {{\n");
    for (i, field) in fields.iter().enumerate() {
        text.push_str(&format!("  string {field} = {};\n", i + 1));
    }
    text.push_str("}\n");
    text
}
