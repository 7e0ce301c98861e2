//! Descriptor schema validation.
//!
//! Program descriptors are validated before they are interpreted. The
//! [`BuiltinSchemas`] validator knows the `program` grammar; hosts with their
//! own grammar files can plug in a different [`SchemaValidator`].

use super::Element;
use crate::program::attrib_location;

/// Validates a parsed descriptor against a named schema.
pub trait SchemaValidator {
    /// Returns a diagnostic when `root` does not conform to `schema`.
    fn validate(&self, schema: &str, root: &Element) -> Result<(), String>;
}

/// Validator that accepts every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SchemaValidator for AcceptAll {
    fn validate(&self, _schema: &str, _root: &Element) -> Result<(), String> {
        Ok(())
    }
}

/// Structural validator for the grammars shipped with the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSchemas;

/// Schema name of program descriptors.
pub const PROGRAM_SCHEMA: &str = "program";

impl SchemaValidator for BuiltinSchemas {
    fn validate(&self, schema: &str, root: &Element) -> Result<(), String> {
        match schema {
            PROGRAM_SCHEMA => validate_program(root),
            other => Err(format!("unknown schema '{other}'")),
        }
    }
}

struct Rule {
    required: &'static [&'static str],
    optional: &'static [&'static str],
}

const DEFINE: Rule = Rule {
    required: &["name", "value"],
    optional: &[],
};
const STAGE: Rule = Rule {
    required: &["file"],
    optional: &[],
};
const VERTEX_UNIFORM: Rule = Rule {
    required: &["name", "loc"],
    optional: &["if"],
};
const FRAGMENT_UNIFORM: Rule = Rule {
    required: &["name", "loc"],
    optional: &["type", "if"],
};
const STREAM: Rule = Rule {
    required: &["name"],
    optional: &["if"],
};
const ATTRIB: Rule = Rule {
    required: &["name", "semantics"],
    optional: &["if"],
};

fn check_attributes(element: &Element, rule: &Rule) -> Result<(), String> {
    for required in rule.required {
        if !element.has_attr(required) {
            return Err(format!(
                "<{}> is missing required attribute '{required}'",
                element.name()
            ));
        }
    }
    for name in element.attr_names() {
        if !rule.required.contains(&name) && !rule.optional.contains(&name) {
            return Err(format!(
                "<{}> has unexpected attribute '{name}'",
                element.name()
            ));
        }
    }
    Ok(())
}

fn validate_program(root: &Element) -> Result<(), String> {
    if root.name() != "program" {
        return Err(format!("expected <program> root, found <{}>", root.name()));
    }
    check_attributes(
        root,
        &Rule {
            required: &["type"],
            optional: &[],
        },
    )?;
    if !matches!(root.attr("type"), "arb" | "glsl") {
        return Err(format!(
            "<program> type must be 'arb' or 'glsl', found '{}'",
            root.attr("type")
        ));
    }

    let mut vertex_count = 0;
    let mut fragment_count = 0;

    for child in root.children() {
        match child.name() {
            "define" => check_attributes(child, &DEFINE)?,
            "vertex" => {
                vertex_count += 1;
                check_attributes(child, &STAGE)?;
                for param in child.children() {
                    let rule = match param.name() {
                        "uniform" => &VERTEX_UNIFORM,
                        "stream" => &STREAM,
                        "attrib" => &ATTRIB,
                        other => return Err(format!("unexpected <{other}> in <vertex>")),
                    };
                    check_attributes(param, rule)?;
                    if param.name() == "attrib" && attrib_location(param.attr("semantics")).is_none() {
                        return Err(format!(
                            "<attrib name=\"{}\"> has unknown semantics '{}'",
                            param.attr("name"),
                            param.attr("semantics")
                        ));
                    }
                }
            }
            "fragment" => {
                fragment_count += 1;
                check_attributes(child, &STAGE)?;
                for param in child.children() {
                    if param.name() != "uniform" {
                        return Err(format!("unexpected <{}> in <fragment>", param.name()));
                    }
                    check_attributes(param, &FRAGMENT_UNIFORM)?;
                }
            }
            other => return Err(format!("unexpected <{other}> in <program>")),
        }
    }

    if vertex_count != 1 || fragment_count != 1 {
        return Err(format!(
            "<program> needs exactly one <vertex> and one <fragment> (found {vertex_count} and {fragment_count})"
        ));
    }
    Ok(())
}
