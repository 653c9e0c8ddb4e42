//! # Generated Modules
//!
//! Parses and executes the text the schema compiler emits. Executing a
//! module runs its top-level statements in order and produces a
//! [`LoadedModule`]: the module's file descriptor plus an ordered list of
//! name → [`Binding`] pairs.
//!
//! ## Module Text
//!
//! ```text
//! # Generated by idlc. DO NOT EDIT!
//! module "person.idl"
//! # @@insertion_point(imports)
//! import .address_idl
//!
//! const MAX_PHONES = 4
//!
//! enum Kind {
//!   HOME = 0
//!   WORK = 1
//! }
//!
//! message Person {
//!   singular string name = 1
//!   singular Kind kind = 2
//!   repeated address_idl.Address addresses = 3
//! }
//! ```
//!
//! Field types are scalar keywords, names bound earlier in the module (or
//! the enclosing message's own name), or `<module>.<Name>` through an
//! import binding.
//!
//! ## Resolution
//!
//! Package-relative imports (`import .x`) resolve against a
//! [`ResolutionContext`] owned by the caller. Nothing is registered in any
//! process-wide table; when the context is dropped, every loaded module
//! goes with it. An import of a module the context does not hold yet fails
//! with the retryable [`LoadError::MissingDependency`]. Absolute imports
//! never resolve.

use std::collections::HashMap;
use std::sync::Arc;

use mfac_core::{
    EnumType, EnumValue, FieldDescriptor, FieldKind, FileDescriptor, Label, MessageRef,
    MessageType, ScalarType,
};

use crate::error::LoadError;

/// Name under which a module's file descriptor is bound.
pub const DESCRIPTOR_BINDING: &str = "DESCRIPTOR";

/// A value bound at module top level.
///
/// The variant is the capability marker: only [`Binding::Message`] values
/// are message types, whatever else a module defines.
#[derive(Debug, Clone)]
pub enum Binding {
    /// The module's self-describing metadata.
    Descriptor(FileDescriptor),
    /// An imported sibling module.
    Module(Arc<LoadedModule>),
    /// A message type definition.
    Message(Arc<MessageType>),
    /// An enum type definition.
    Enum(Arc<EnumType>),
    /// An ordinary constant.
    Constant(Constant),
}

/// Literal value of a `const` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// The result of executing one generated module.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    name: String,
    descriptor: FileDescriptor,
    bindings: Vec<(String, Binding)>,
}

impl LoadedModule {
    /// Module name, e.g. `person_idl`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor naming the schema file this module was generated from.
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    /// Top-level bindings in first-definition order.
    pub fn bindings(&self) -> &[(String, Binding)] {
        &self.bindings
    }

    /// Look up a top-level binding.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, binding)| binding)
    }

    /// Message types defined (or re-bound) at top level, in binding order.
    pub fn message_types(&self) -> impl Iterator<Item = &Arc<MessageType>> {
        self.bindings.iter().filter_map(|(_, binding)| match binding {
            Binding::Message(ty) => Some(ty),
            _ => None,
        })
    }
}

/// Modules loaded so far in one pass, by module name.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    modules: HashMap<String, Arc<LoadedModule>>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<LoadedModule>> {
        self.modules.get(name)
    }

    /// Make `module` resolvable by later relative imports.
    pub fn insert(&mut self, module: Arc<LoadedModule>) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Parse and execute the module `name` with source text `source`.
///
/// # Errors
///
/// Syntax errors, unknown types, absolute imports, and a missing
/// descriptor are permanent. [`LoadError::MissingDependency`] means the
/// module may succeed once the named dependency is in `context`.
pub fn execute(
    name: &str,
    source: &str,
    context: &ResolutionContext,
) -> Result<LoadedModule, LoadError> {
    let statements = parse(name, source)?;
    let mut scope = Scope {
        module: name,
        descriptor: None,
        bindings: Vec::new(),
    };
    for statement in statements {
        scope.run(statement, context)?;
    }
    let descriptor = scope.descriptor.ok_or_else(|| LoadError::MissingDescriptor {
        module: name.to_string(),
    })?;
    Ok(LoadedModule {
        name: name.to_string(),
        descriptor,
        bindings: scope.bindings,
    })
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Module { file: String },
    Import { line: usize, target: String, relative: bool },
    Const { name: String, value: Constant },
    Enum { name: String, values: Vec<EnumValue> },
    Message { name: String, fields: Vec<FieldDecl> },
}

#[derive(Debug, Clone, PartialEq)]
struct FieldDecl {
    line: usize,
    label: Label,
    type_name: String,
    name: String,
    number: u32,
}

fn parse(module: &str, source: &str) -> Result<Vec<Statement>, LoadError> {
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text.trim()))
        .filter(|(_, text)| !text.is_empty() && !text.starts_with('#'));
    let syntax = |line: usize, reason: String| LoadError::Syntax {
        module: module.to_string(),
        line,
        reason,
    };

    let mut statements = Vec::new();
    while let Some((line, text)) = lines.next() {
        let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let rest = rest.trim();
        let statement = match keyword {
            "module" => Statement::Module {
                file: parse_string(rest).ok_or_else(|| {
                    syntax(line, format!("expected quoted schema file name, got {rest:?}"))
                })?,
            },
            "import" => {
                let (relative, target) = match rest.strip_prefix('.') {
                    Some(target) => (true, target),
                    None => (false, rest),
                };
                if !is_identifier(target) {
                    return Err(syntax(line, format!("invalid import target {rest:?}")));
                }
                Statement::Import {
                    line,
                    target: target.to_string(),
                    relative,
                }
            }
            "const" => {
                let (name, literal) = rest
                    .split_once('=')
                    .map(|(n, l)| (n.trim(), l.trim()))
                    .ok_or_else(|| syntax(line, "expected `const NAME = value`".to_string()))?;
                if !is_identifier(name) {
                    return Err(syntax(line, format!("invalid constant name {name:?}")));
                }
                let value = parse_constant(literal)
                    .ok_or_else(|| syntax(line, format!("invalid constant value {literal:?}")))?;
                Statement::Const {
                    name: name.to_string(),
                    value,
                }
            }
            "enum" | "message" => {
                let name = block_name(rest)
                    .ok_or_else(|| syntax(line, format!("expected `{keyword} Name {{`")))?;
                let mut body = Vec::new();
                loop {
                    match lines.next() {
                        Some((_, "}")) => break,
                        Some(entry) => body.push(entry),
                        None => {
                            return Err(syntax(line, format!("unterminated {keyword} '{name}'")))
                        }
                    }
                }
                if keyword == "enum" {
                    Statement::Enum {
                        name: name.to_string(),
                        values: parse_enum_values(&body).map_err(|(l, r)| syntax(l, r))?,
                    }
                } else {
                    Statement::Message {
                        name: name.to_string(),
                        fields: parse_fields(&body).map_err(|(l, r)| syntax(l, r))?,
                    }
                }
            }
            other => return Err(syntax(line, format!("unexpected statement {other:?}"))),
        };
        statements.push(statement);
    }
    Ok(statements)
}

fn block_name(header: &str) -> Option<&str> {
    let name = header.strip_suffix('{')?.trim();
    is_identifier(name).then_some(name)
}

fn parse_enum_values(body: &[(usize, &str)]) -> Result<Vec<EnumValue>, (usize, String)> {
    let mut values: Vec<EnumValue> = Vec::new();
    for &(line, text) in body {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [name, "=", number] = tokens[..] else {
            return Err((line, format!("expected `NAME = number`, got {text:?}")));
        };
        if !is_identifier(name) {
            return Err((line, format!("invalid enum value name {name:?}")));
        }
        if values.iter().any(|v| v.name == name) {
            return Err((line, format!("duplicate enum value {name:?}")));
        }
        let number = number
            .parse::<i32>()
            .map_err(|_| (line, format!("invalid enum number {number:?}")))?;
        values.push(EnumValue {
            name: name.to_string(),
            number,
        });
    }
    Ok(values)
}

fn parse_fields(body: &[(usize, &str)]) -> Result<Vec<FieldDecl>, (usize, String)> {
    let mut fields: Vec<FieldDecl> = Vec::new();
    for &(line, text) in body {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [label, type_name, name, "=", number] = tokens[..] else {
            return Err((line, format!("expected `label type name = number`, got {text:?}")));
        };
        let label = label.parse::<Label>().map_err(|e| (line, e.to_string()))?;
        if !is_type_reference(type_name) {
            return Err((line, format!("invalid type reference {type_name:?}")));
        }
        if !is_identifier(name) {
            return Err((line, format!("invalid field name {name:?}")));
        }
        let number = number
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| (line, format!("invalid field number {number:?}")))?;
        if let Some(dup) = fields.iter().find(|f| f.name == name || f.number == number) {
            return Err((line, format!("field {name:?} = {number} clashes with {:?} = {}", dup.name, dup.number)));
        }
        fields.push(FieldDecl {
            line,
            label,
            type_name: type_name.to_string(),
            name: name.to_string(),
            number,
        });
    }
    Ok(fields)
}

fn parse_string(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then(|| inner.to_string())
}

fn parse_constant(literal: &str) -> Option<Constant> {
    match literal {
        "true" => return Some(Constant::Bool(true)),
        "false" => return Some(Constant::Bool(false)),
        _ => {}
    }
    if let Some(s) = parse_string(literal) {
        return Some(Constant::Str(s));
    }
    if let Ok(n) = literal.parse::<i64>() {
        return Some(Constant::Int(n));
    }
    literal.parse::<f64>().ok().map(Constant::Float)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_type_reference(s: &str) -> bool {
    match s.split_once('.') {
        Some((module, name)) => is_identifier(module) && is_identifier(name),
        None => is_identifier(s),
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

struct Scope<'a> {
    module: &'a str,
    descriptor: Option<FileDescriptor>,
    bindings: Vec<(String, Binding)>,
}

impl Scope<'_> {
    fn run(&mut self, statement: Statement, context: &ResolutionContext) -> Result<(), LoadError> {
        match statement {
            Statement::Module { file } => {
                let descriptor = FileDescriptor { name: file };
                self.descriptor = Some(descriptor.clone());
                self.bind(DESCRIPTOR_BINDING, Binding::Descriptor(descriptor));
            }
            Statement::Import {
                line,
                target,
                relative: false,
            } => {
                return Err(LoadError::AbsoluteImport {
                    module: self.module.to_string(),
                    line,
                    import: target,
                });
            }
            Statement::Import { target, .. } => {
                let dependency =
                    context
                        .get(&target)
                        .ok_or_else(|| LoadError::MissingDependency {
                            module: self.module.to_string(),
                            dependency: target.clone(),
                        })?;
                self.bind(&target, Binding::Module(Arc::clone(dependency)));
            }
            Statement::Const { name, value } => self.bind(&name, Binding::Constant(value)),
            Statement::Enum { name, values } => {
                let enum_type = EnumType {
                    name: name.clone(),
                    file: self.file()?,
                    values,
                };
                self.bind(&name, Binding::Enum(Arc::new(enum_type)));
            }
            Statement::Message { name, fields } => {
                let file = self.file()?;
                let fields = fields
                    .into_iter()
                    .map(|decl| -> Result<FieldDescriptor, LoadError> {
                        Ok(FieldDescriptor {
                            kind: self.resolve_type(&decl, &name, &file)?,
                            name: decl.name,
                            number: decl.number,
                            label: decl.label,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let message_type = MessageType {
                    name: name.clone(),
                    file,
                    fields,
                };
                self.bind(&name, Binding::Message(Arc::new(message_type)));
            }
        }
        Ok(())
    }

    fn file(&self) -> Result<String, LoadError> {
        self.descriptor
            .as_ref()
            .map(|d| d.name.clone())
            .ok_or_else(|| LoadError::MissingDescriptor {
                module: self.module.to_string(),
            })
    }

    fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, binding)| binding)
    }

    // Rebinding keeps the name's original position.
    fn bind(&mut self, name: &str, binding: Binding) {
        match self.bindings.iter_mut().find(|(bound, _)| bound == name) {
            Some(slot) => slot.1 = binding,
            None => self.bindings.push((name.to_string(), binding)),
        }
    }

    fn resolve_type(
        &self,
        decl: &FieldDecl,
        message: &str,
        file: &str,
    ) -> Result<FieldKind, LoadError> {
        if let Ok(scalar) = decl.type_name.parse::<ScalarType>() {
            return Ok(FieldKind::Scalar { scalar });
        }
        if decl.type_name == message {
            return Ok(FieldKind::Message {
                message: MessageRef {
                    name: message.to_string(),
                    file: file.to_string(),
                },
            });
        }
        let binding = match decl.type_name.split_once('.') {
            Some((module, name)) => match self.get(module) {
                Some(Binding::Module(imported)) => imported.get(name),
                _ => None,
            },
            None => self.get(&decl.type_name),
        };
        match binding {
            Some(Binding::Message(ty)) => Ok(FieldKind::Message { message: ty.to_ref() }),
            Some(Binding::Enum(ty)) => Ok(FieldKind::Enum {
                enum_type: EnumType::clone(ty),
            }),
            _ => Err(LoadError::UnknownType {
                module: self.module.to_string(),
                line: decl.line,
                type_name: decl.type_name.clone(),
            }),
        }
    }
}
