//! Path resolver and node mixer.
//!
//! Walks a [`Node`] tree segment by segment and replaces every node addressed
//! by a [`PathExpr`] with a shape instance built from that node's own fields.
//! Resolution never fails: branches the path does not match are left alone and
//! recorded in the returned [`MixReport`].

use std::fmt;

use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Fields, Node};
use crate::domain::path::{Location, PathExpr, Segment, Step};
use crate::domain::shape::{Shape, ShapeFactory};

/// Node that was addressed but could not be mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    pub location: Location,
    /// Kind of the node found there (`"string"`, `"array"`, ...)
    pub found: &'static str,
}

/// Branch where a literal segment found nothing to descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Node the segment was looked up on
    pub at: Location,
    pub segment: String,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: no object at '{}'", self.at, self.segment)
    }
}

/// Outcome of one or more path applications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixReport {
    /// Locations replaced by shape instances, in traversal order
    pub mixed: Vec<Location>,
    /// Addressed nodes left unmixed because they are not field-bearing objects
    pub skipped: Vec<SkippedNode>,
    /// Branches the path did not match (silent no-ops)
    pub unresolved: Vec<Unresolved>,
}

impl MixReport {
    pub fn mixed_count(&self) -> usize {
        self.mixed.len()
    }

    /// True when nothing was skipped as a malformed mix target.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Append another report, keeping order.
    pub fn merge(&mut self, other: MixReport) {
        self.mixed.extend(other.mixed);
        self.skipped.extend(other.skipped);
        self.unresolved.extend(other.unresolved);
    }
}

/// Mix a field bag into a fresh shape instance.
///
/// Fields are moved onto the instance in source order, overwriting anything the
/// factory predefined. Nested values are moved as they are, never mixed.
pub fn mix(factory: &dyn ShapeFactory, fields: Fields) -> Box<dyn Shape> {
    let mut shape = factory.create();
    for (key, value) in fields {
        shape.assign(key, value);
    }
    shape
}

/// Replace `node` with a shape instance built from its own fields.
///
/// Plain mappings and already mixed nodes are accepted. Anything else is a
/// malformed mix target and is left untouched.
pub fn mix_node(factory: &dyn ShapeFactory, node: &mut Node) -> DomainResult<()> {
    mix_node_at(factory, node, &Location::root())
}

fn mix_node_at(factory: &dyn ShapeFactory, node: &mut Node, location: &Location) -> DomainResult<()> {
    let fields = match std::mem::take(node) {
        Node::Object(fields) => fields,
        Node::Mixed(shape) => shape.into_fields(),
        other => {
            let found = other.kind();
            *node = other;
            return Err(DomainError::MalformedMixTarget {
                location: location.clone(),
                found,
            });
        }
    };
    *node = Node::Mixed(mix(factory, fields));
    Ok(())
}

/// Apply `factory` at every node addressed by `path`, rewriting `tree` in place.
#[instrument(level = "debug", skip_all, fields(path = %path))]
pub fn apply_shape(factory: &dyn ShapeFactory, path: &PathExpr, tree: &mut Node) -> MixReport {
    let mut walker = Walker {
        factory,
        report: MixReport::default(),
        location: Location::root(),
    };
    walker.walk(tree, path.segments());
    debug!(
        mixed = walker.report.mixed.len(),
        skipped = walker.report.skipped.len(),
        unresolved = walker.report.unresolved.len(),
        "path applied"
    );
    walker.report
}

/// Locations [`apply_shape`] would mix, without touching the tree.
pub fn locate(path: &PathExpr, tree: &Node) -> Vec<Location> {
    let mut found = Vec::new();
    let mut location = Location::root();
    locate_rec(tree, path.segments(), &mut location, &mut found);
    found
}

struct Walker<'f> {
    factory: &'f dyn ShapeFactory,
    report: MixReport,
    location: Location,
}

impl Walker<'_> {
    fn walk(&mut self, node: &mut Node, segments: &[Segment]) {
        let Some((segment, rest)) = segments.split_first() else {
            self.mix_here(node);
            return;
        };

        match segment {
            Segment::Wildcard => self.broadcast(node, rest),
            Segment::Key { name, spread } => {
                let step = node.step_for(name);
                let Some(child) = node.get_mut(name).filter(|c| c.is_object_like()) else {
                    trace!(at = %self.location, segment = %name, "unresolved segment");
                    self.report.unresolved.push(Unresolved {
                        at: self.location.clone(),
                        segment: name.clone(),
                    });
                    return;
                };

                self.location.push(step);
                match child {
                    Node::Array(items) => self.each_element(items, rest),
                    other if *spread => self.broadcast(other, rest),
                    other => self.walk(other, rest),
                }
                self.location.pop();
            }
        }
    }

    /// Recurse into every own key or element of `node` with the same remaining segments.
    fn broadcast(&mut self, node: &mut Node, rest: &[Segment]) {
        match node {
            Node::Array(items) => self.each_element(items, rest),
            Node::Object(fields) => self.each_field(fields, rest),
            Node::Mixed(shape) => self.each_field(shape.fields_mut(), rest),
            other => trace!(at = %self.location, kind = other.kind(), "wildcard over scalar"),
        }
    }

    fn each_field(&mut self, fields: &mut Fields, rest: &[Segment]) {
        for (key, child) in fields.iter_mut() {
            self.location.push(Step::Key(key.clone()));
            self.walk(child, rest);
            self.location.pop();
        }
    }

    fn each_element(&mut self, items: &mut [Node], rest: &[Segment]) {
        for (index, item) in items.iter_mut().enumerate() {
            self.location.push(Step::Index(index));
            self.walk(item, rest);
            self.location.pop();
        }
    }

    fn mix_here(&mut self, node: &mut Node) {
        match mix_node_at(self.factory, node, &self.location) {
            Ok(()) => self.report.mixed.push(self.location.clone()),
            Err(DomainError::MalformedMixTarget { location, found }) => {
                warn!(at = %location, found, "addressed node is not an object, left unmixed");
                self.report.skipped.push(SkippedNode { location, found });
            }
        }
    }
}

fn locate_rec(node: &Node, segments: &[Segment], location: &mut Location, found: &mut Vec<Location>) {
    let Some((segment, rest)) = segments.split_first() else {
        if matches!(node, Node::Object(_) | Node::Mixed(_)) {
            found.push(location.clone());
        }
        return;
    };

    match segment {
        Segment::Wildcard => locate_broadcast(node, rest, location, found),
        Segment::Key { name, spread } => {
            let Some(child) = node.get(name).filter(|c| c.is_object_like()) else {
                return;
            };
            location.push(node.step_for(name));
            match child {
                Node::Array(_) => locate_broadcast(child, rest, location, found),
                _ if *spread => locate_broadcast(child, rest, location, found),
                _ => locate_rec(child, rest, location, found),
            }
            location.pop();
        }
    }
}

fn locate_broadcast(node: &Node, rest: &[Segment], location: &mut Location, found: &mut Vec<Location>) {
    if let Node::Array(items) = node {
        for (index, item) in items.iter().enumerate() {
            location.push(Step::Index(index));
            locate_rec(item, rest, location, found);
            location.pop();
        }
    } else if let Some(fields) = node.fields() {
        for (key, child) in fields {
            location.push(Step::Key(key.clone()));
            locate_rec(child, rest, location, found);
            location.pop();
        }
    }
}
