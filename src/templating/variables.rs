//! Static extraction of the variables a template references.
//!
//! The parsed Tera AST is walked once, so variables inside conditions, untaken
//! branches and loop containers are all found. Names bound by the template
//! itself are not reported:
//!
//! - `for` loop variables and `loop` inside the loop body
//! - `set` / `set_global` targets, from the statement onwards
//! - macro arguments inside the macro body
//!
//! Guarded references are also left out: the subject of an `is defined` /
//! `is undefined` test, and expressions whose first filter is `default`.

use std::collections::BTreeSet;
use tera::ast::{Expr, ExprVal, FunctionCall, Node};

/// Tests whose subject may legitimately be undefined.
const GUARD_TESTS: &[&str] = &["defined", "undefined"];

/// Returns every variable referenced by `nodes` whose root name is not in `bound`.
///
/// Dotted references are reported as written (`contact.email`); subscripts are
/// dropped (`items[0]` is reported as `items`).
#[must_use]
pub fn referenced_variables(nodes: &[Node], bound: &BTreeSet<String>) -> BTreeSet<String> {
    let mut collector = Collector::default();
    let mut scope = bound.clone();
    collector.nodes(nodes, &mut scope);
    collector.found
}

#[derive(Default)]
struct Collector {
    found: BTreeSet<String>,
}

impl Collector {
    fn nodes(&mut self, nodes: &[Node], scope: &mut BTreeSet<String>) {
        for node in nodes {
            self.node(node, scope);
        }
    }

    fn node(&mut self, node: &Node, scope: &mut BTreeSet<String>) {
        match node {
            Node::VariableBlock(_, expr) => self.expr(expr, scope),
            Node::Set(_, set) => {
                self.expr(&set.value, scope);
                scope.insert(set.key.clone());
            }
            Node::If(branches, _) => {
                for (_, condition, body) in &branches.conditions {
                    self.expr(condition, scope);
                    self.nodes(body, &mut scope.clone());
                }
                if let Some((_, body)) = &branches.otherwise {
                    self.nodes(body, &mut scope.clone());
                }
            }
            Node::Forloop(_, forloop, _) => {
                self.expr(&forloop.container, scope);
                let mut inner = scope.clone();
                inner.insert(forloop.value.clone());
                inner.insert("loop".to_string());
                if let Some(key) = &forloop.key {
                    inner.insert(key.clone());
                }
                self.nodes(&forloop.body, &mut inner);
                if let Some(empty) = &forloop.empty_body {
                    self.nodes(empty, &mut scope.clone());
                }
            }
            Node::Block(_, block, _) => self.nodes(&block.body, scope),
            Node::FilterSection(_, section, _) => {
                self.call(&section.filter, scope);
                self.nodes(&section.body, &mut scope.clone());
            }
            Node::MacroDefinition(_, definition, _) => {
                let mut inner = scope.clone();
                for (name, default) in &definition.args {
                    if let Some(default) = default {
                        self.expr(default, scope);
                    }
                    inner.insert(name.clone());
                }
                self.nodes(&definition.body, &mut inner);
            }
            Node::Super
            | Node::Text(_)
            | Node::Extends(..)
            | Node::Include(..)
            | Node::ImportMacro(..)
            | Node::Raw(..)
            | Node::Break(_)
            | Node::Continue(_)
            | Node::Comment(..) => {}
        }
    }

    fn expr(&mut self, expr: &Expr, scope: &BTreeSet<String>) {
        let guarded = expr.has_default_filter();
        match &expr.val {
            ExprVal::Ident(ident) if !guarded => self.ident(ident, scope),
            val => self.value(val, scope),
        }
        for filter in &expr.filters {
            self.call(filter, scope);
        }
    }

    fn value(&mut self, val: &ExprVal, scope: &BTreeSet<String>) {
        match val {
            ExprVal::Ident(_)
            | ExprVal::String(_)
            | ExprVal::Int(_)
            | ExprVal::Float(_)
            | ExprVal::Bool(_) => {}
            ExprVal::Math(math) => {
                self.expr(&math.lhs, scope);
                self.expr(&math.rhs, scope);
            }
            ExprVal::Logic(logic) => {
                self.expr(&logic.lhs, scope);
                self.expr(&logic.rhs, scope);
            }
            ExprVal::In(membership) => {
                self.expr(&membership.lhs, scope);
                self.expr(&membership.rhs, scope);
            }
            ExprVal::Test(test) => {
                if !GUARD_TESTS.contains(&test.name.as_str()) {
                    self.ident(&test.ident, scope);
                }
                for arg in &test.args {
                    self.expr(arg, scope);
                }
            }
            ExprVal::FunctionCall(call) => self.call(call, scope),
            ExprVal::MacroCall(call) => {
                for arg in call.args.values() {
                    self.expr(arg, scope);
                }
            }
            ExprVal::Array(items) => {
                for item in items {
                    self.expr(item, scope);
                }
            }
            ExprVal::StringConcat(concat) => {
                for part in &concat.values {
                    if let ExprVal::Ident(ident) = part {
                        self.ident(ident, scope);
                    }
                }
            }
        }
    }

    fn call(&mut self, call: &FunctionCall, scope: &BTreeSet<String>) {
        for arg in call.args.values() {
            self.expr(arg, scope);
        }
    }

    fn ident(&mut self, ident: &str, scope: &BTreeSet<String>) {
        let path = ident.split('[').next().unwrap_or(ident);
        let root = path.split('.').next().unwrap_or(path);
        if root.is_empty() || scope.contains(root) {
            return;
        }
        self.found.insert(path.to_string());
    }
}
