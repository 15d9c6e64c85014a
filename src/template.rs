//! # Template Mini-Language
//!
//! A constrained, non-Turing-complete templating language for module file
//! templates:
//!
//! - `{{var}}`: substitution from the generation context's variables
//! - `{{#if cond}}...{{/if}}`: conditional block on variable truthiness
//! - `{{#each list}}...{{/each}}`: iteration over a list or map, with
//!   `{{this}}` and `{{@key}}` bound inside the loop body
//!
//! No arbitrary expression evaluation is permitted; the closed node set above
//! is the whole language. The implementation is a small recursive-descent
//! parser producing an AST (text, variable, if and each nodes) evaluated
//! against a variable scope, never regex substitution, which falls apart
//! under nesting.
//!
//! Errors carry the target path and, where applicable, the offending variable
//! name, so generation failures point at the exact template and binding.

use std::path::Path;

use crate::context::{GenerationContext, VarValue};
use crate::error::{Error, Result};

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Var(String),
    If { cond: String, body: Vec<Node> },
    Each { list: String, body: Vec<Node> },
}

/// Parse and render in one step.
pub fn render(source: &str, context: &GenerationContext, target: &Path) -> Result<String> {
    Template::parse(source, target)?.render(context, target)
}

impl Template {
    /// Parse template source into an AST.
    ///
    /// `target` is the output path the template is for, used in error
    /// reporting only.
    pub fn parse(source: &str, target: &Path) -> Result<Template> {
        let mut parser = Parser {
            source,
            pos: 0,
            target,
        };
        let nodes = parser.parse_nodes(None)?;
        Ok(Template { nodes })
    }

    /// Render the AST against the context's variables.
    pub fn render(&self, context: &GenerationContext, target: &Path) -> Result<String> {
        let mut out = String::new();
        render_nodes(&self.nodes, context, &mut Vec::new(), &mut out, target)?;
        Ok(out)
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    target: &'a Path,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>, variable: Option<String>) -> Error {
        Error::Template {
            path: self.target.to_path_buf(),
            message: message.into(),
            variable,
        }
    }

    /// Parse until end of input or until the matching close tag for
    /// `open_block` ("if" / "each") is consumed.
    fn parse_nodes(&mut self, open_block: Option<&str>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            let rest = &self.source[self.pos..];
            match rest.find("{{") {
                None => {
                    if !rest.is_empty() {
                        nodes.push(Node::Text(rest.to_string()));
                        self.pos = self.source.len();
                    }
                    return match open_block {
                        None => Ok(nodes),
                        Some(block) => {
                            Err(self.error(format!("unclosed {{{{#{block}}}}} block"), None))
                        }
                    };
                }
                Some(offset) => {
                    if offset > 0 {
                        nodes.push(Node::Text(rest[..offset].to_string()));
                    }
                    self.pos += offset;

                    let tag = self.read_tag()?;
                    match tag {
                        Tag::Var(name) => nodes.push(Node::Var(name)),
                        Tag::OpenIf(cond) => {
                            let body = self.parse_nodes(Some("if"))?;
                            nodes.push(Node::If { cond, body });
                        }
                        Tag::OpenEach(list) => {
                            let body = self.parse_nodes(Some("each"))?;
                            nodes.push(Node::Each { list, body });
                        }
                        Tag::Close(kind) => {
                            return match open_block {
                                Some(block) if block == kind => Ok(nodes),
                                Some(block) => Err(self.error(
                                    format!("expected {{{{/{block}}}}} but found {{{{/{kind}}}}}"),
                                    None,
                                )),
                                None => Err(self
                                    .error(format!("{{{{/{kind}}}}} without a matching open tag"), None)),
                            };
                        }
                    }
                }
            }
        }
    }

    /// Consume one `{{...}}` tag starting at `self.pos`.
    fn read_tag(&mut self) -> Result<Tag> {
        let rest = &self.source[self.pos..];
        debug_assert!(rest.starts_with("{{"));
        let end = rest
            .find("}}")
            .ok_or_else(|| self.error("'{{' without matching '}}'", None))?;
        let inner = rest[2..end].trim();
        self.pos += end + 2;

        if inner.is_empty() {
            return Err(self.error("empty template tag", None));
        }

        if let Some(kind) = inner.strip_prefix('/') {
            let kind = kind.trim();
            if kind != "if" && kind != "each" {
                return Err(self.error(format!("unknown close tag '{{{{/{kind}}}}}'"), None));
            }
            return Ok(Tag::Close(kind.to_string()));
        }

        if let Some(directive) = inner.strip_prefix('#') {
            let mut parts = directive.split_whitespace();
            let keyword = parts.next().unwrap_or_default();
            let argument = parts.next();
            if parts.next().is_some() {
                return Err(self.error(
                    format!("too many arguments in '{{{{#{directive}}}}}'"),
                    None,
                ));
            }
            return match (keyword, argument) {
                ("if", Some(cond)) => Ok(Tag::OpenIf(cond.to_string())),
                ("each", Some(list)) => Ok(Tag::OpenEach(list.to_string())),
                ("if", None) | ("each", None) => {
                    Err(self.error(format!("'{{{{#{keyword}}}}}' needs a variable name"), None))
                }
                _ => Err(self.error(
                    format!("unknown directive '{{{{#{keyword}}}}}'; only #if and #each exist"),
                    None,
                )),
            };
        }

        if inner.contains(char::is_whitespace) {
            return Err(self.error(
                format!("'{{{{{inner}}}}}' is not a plain variable; expressions are not supported"),
                None,
            ));
        }

        Ok(Tag::Var(inner.to_string()))
    }
}

enum Tag {
    Var(String),
    OpenIf(String),
    OpenEach(String),
    Close(String),
}

/// A loop frame: the `{{@key}}` and `{{this}}` bindings of one iteration.
struct Frame {
    key: String,
    this: String,
}

fn render_nodes(
    nodes: &[Node],
    context: &GenerationContext,
    frames: &mut Vec<Frame>,
    out: &mut String,
    target: &Path,
) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                let value = lookup_scalar(name, context, frames).ok_or_else(|| Error::Template {
                    path: target.to_path_buf(),
                    message: "undefined variable".to_string(),
                    variable: Some(name.clone()),
                })?;
                out.push_str(&value);
            }
            Node::If { cond, body } => {
                if lookup_truthy(cond, context, frames) {
                    render_nodes(body, context, frames, out, target)?;
                }
            }
            Node::Each { list, body } => {
                let value = context.variable(list).ok_or_else(|| Error::Template {
                    path: target.to_path_buf(),
                    message: "cannot iterate undefined variable".to_string(),
                    variable: Some(list.clone()),
                })?;
                match value {
                    VarValue::List(items) => {
                        for (index, item) in items.iter().enumerate() {
                            frames.push(Frame {
                                key: index.to_string(),
                                this: item.clone(),
                            });
                            render_nodes(body, context, frames, out, target)?;
                            frames.pop();
                        }
                    }
                    VarValue::Map(entries) => {
                        for (key, item) in entries {
                            frames.push(Frame {
                                key: key.clone(),
                                this: item.clone(),
                            });
                            render_nodes(body, context, frames, out, target)?;
                            frames.pop();
                        }
                    }
                    VarValue::Str(_) | VarValue::Bool(_) => {
                        return Err(Error::Template {
                            path: target.to_path_buf(),
                            message: "variable is not iterable".to_string(),
                            variable: Some(list.clone()),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Resolve a `{{var}}` position: loop bindings shadow context variables.
fn lookup_scalar(
    name: &str,
    context: &GenerationContext,
    frames: &[Frame],
) -> Option<String> {
    match name {
        "this" => frames.last().map(|f| f.this.clone()),
        "@key" => frames.last().map(|f| f.key.clone()),
        _ => context.variable(name).and_then(VarValue::as_scalar),
    }
}

/// Truthiness for `{{#if}}`: missing variables are simply falsy.
fn lookup_truthy(name: &str, context: &GenerationContext, frames: &[Frame]) -> bool {
    match name {
        "this" => frames
            .last()
            .map(|f| !f.this.is_empty() && f.this != "false" && f.this != "no")
            .unwrap_or(false),
        "@key" => frames.last().is_some(),
        _ => context
            .variable(name)
            .map(VarValue::is_truthy)
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn ctx() -> GenerationContext {
        let mut options = BTreeMap::new();
        options.insert("strict_typing".to_string(), "yes".to_string());
        let mut ctx = GenerationContext::new("my-app", "/tmp/out", options);
        ctx.set_variable("framework", "frame-a");
        ctx.set_variable("use_auth", true);
        ctx.set_variable("no_auth", false);
        ctx.set_variable(
            "plugins",
            VarValue::List(vec!["router".to_string(), "store".to_string()]),
        );
        let mut scripts = BTreeMap::new();
        scripts.insert("build".to_string(), "vite build".to_string());
        scripts.insert("dev".to_string(), "vite".to_string());
        ctx.set_variable("scripts", VarValue::Map(scripts));
        ctx
    }

    fn target() -> PathBuf {
        PathBuf::from("src/index.ts")
    }

    fn render_str(source: &str) -> Result<String> {
        render(source, &ctx(), &target())
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render_str("hello world").unwrap(), "hello world");
    }

    #[test]
    fn test_variable_substitution() {
        assert_eq!(
            render_str("project: {{project_name}}, fw: {{framework}}").unwrap(),
            "project: my-app, fw: frame-a"
        );
    }

    #[test]
    fn test_bool_variable_renders_as_literal() {
        assert_eq!(render_str("auth={{use_auth}}").unwrap(), "auth=true");
    }

    #[test]
    fn test_undefined_variable_errors_with_name() {
        let err = render_str("{{nope}}").unwrap_err();
        match err {
            Error::Template { variable, .. } => assert_eq!(variable.as_deref(), Some("nope")),
            other => panic!("expected Template error, got {other:?}"),
        }
    }

    #[test]
    fn test_if_block_truthy() {
        assert_eq!(render_str("{{#if use_auth}}guarded{{/if}}").unwrap(), "guarded");
        assert_eq!(render_str("{{#if no_auth}}guarded{{/if}}").unwrap(), "");
    }

    #[test]
    fn test_if_missing_variable_is_falsy() {
        assert_eq!(render_str("{{#if ghost}}x{{/if}}").unwrap(), "");
    }

    #[test]
    fn test_each_over_list_with_this_and_key() {
        let out = render_str("{{#each plugins}}{{@key}}:{{this}};{{/each}}").unwrap();
        assert_eq!(out, "0:router;1:store;");
    }

    #[test]
    fn test_each_over_map() {
        let out = render_str("{{#each scripts}}\"{{@key}}\": \"{{this}}\"\n{{/each}}").unwrap();
        assert_eq!(out, "\"build\": \"vite build\"\n\"dev\": \"vite\"\n");
    }

    #[test]
    fn test_nested_if_inside_each() {
        let out =
            render_str("{{#each plugins}}{{#if use_auth}}{{this}} {{/if}}{{/each}}").unwrap();
        assert_eq!(out, "router store ");
    }

    #[test]
    fn test_nested_blocks_parse() {
        let out = render_str(
            "{{#if use_auth}}A{{#if strict_typing}}B{{/if}}C{{/if}}",
        )
        .unwrap();
        assert_eq!(out, "ABC");
    }

    #[test]
    fn test_each_over_scalar_errors() {
        let err = render_str("{{#each framework}}{{this}}{{/each}}").unwrap_err();
        assert!(err.to_string().contains("not iterable"));
    }

    #[test]
    fn test_each_over_undefined_errors() {
        let err = render_str("{{#each ghost}}{{this}}{{/each}}").unwrap_err();
        assert!(err.to_string().contains("cannot iterate"));
    }

    #[test]
    fn test_unclosed_block_rejected() {
        let err = render_str("{{#if use_auth}}never closed").unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_mismatched_close_rejected() {
        let err = render_str("{{#if use_auth}}x{{/each}}").unwrap_err();
        assert!(err.to_string().contains("expected {{/if}}"));
    }

    #[test]
    fn test_stray_close_rejected() {
        let err = render_str("x{{/if}}").unwrap_err();
        assert!(err.to_string().contains("without a matching open tag"));
    }

    #[test]
    fn test_unterminated_tag_rejected() {
        let err = render_str("x{{framework").unwrap_err();
        assert!(err.to_string().contains("without matching"));
    }

    #[test]
    fn test_expressions_rejected() {
        let err = render_str("{{a + b}}").unwrap_err();
        assert!(err.to_string().contains("expressions are not supported"));
    }

    #[test]
    fn test_unknown_directive_rejected() {
        let err = render_str("{{#while x}}{{/while}}").unwrap_err();
        assert!(err.to_string().contains("only #if and #each"));
    }

    #[test]
    fn test_list_variable_in_scalar_position_errors() {
        let err = render_str("{{plugins}}").unwrap_err();
        assert!(err.to_string().contains("undefined variable"));
    }

    #[test]
    fn test_parse_once_render_many() {
        let template = Template::parse("{{project_name}}", &target()).unwrap();
        let a = template.render(&ctx(), &target()).unwrap();
        let b = template.render(&ctx(), &target()).unwrap();
        assert_eq!(a, b);
    }
}
