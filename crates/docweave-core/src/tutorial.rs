//! Tutorial tree
//!
//! Tutorials arrive from the extractor as a flat list where each entry names
//! its children. They are assembled into an owned tree once, up front, so the
//! rest of the pipeline only ever walks parent to child.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while assembling the tutorial tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TutorialError {
    #[error("tutorial '{0}' is defined more than once")]
    Duplicate(String),

    #[error("tutorial '{parent}' lists unknown child '{child}'")]
    UnknownChild { parent: String, child: String },

    #[error("tutorial '{child}' is listed under both '{first}' and '{second}'")]
    MultipleParents {
        child: String,
        first: String,
        second: String,
    },

    #[error("tutorial '{0}' is part of a cycle")]
    Cycle(String),
}

/// A tutorial as supplied by the extractor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TutorialSource {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Already-rendered body
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// A node of the tutorial tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tutorial {
    pub name: String,
    pub title: String,
    pub content: String,
    pub children: Vec<Tutorial>,
}

impl Tutorial {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            content: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Tutorial>) -> Self {
        self.children = children;
        self
    }
}

/// The synthetic root owning every top-level tutorial
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TutorialTree {
    pub children: Vec<Tutorial>,
}

impl TutorialTree {
    pub fn new(children: Vec<Tutorial>) -> Self {
        Self { children }
    }

    /// Assemble the tree from a flat list, keeping declared order
    pub fn build(sources: Vec<TutorialSource>) -> Result<Self, TutorialError> {
        let mut by_name: HashMap<String, TutorialSource> = HashMap::new();
        let mut order = Vec::with_capacity(sources.len());

        for source in sources {
            if by_name.contains_key(&source.name) {
                return Err(TutorialError::Duplicate(source.name));
            }
            order.push(source.name.clone());
            by_name.insert(source.name.clone(), source);
        }

        let mut parent_of: HashMap<&str, &str> = HashMap::new();
        for name in &order {
            let source = &by_name[name];
            for child in &source.children {
                if !by_name.contains_key(child) {
                    return Err(TutorialError::UnknownChild {
                        parent: name.clone(),
                        child: child.clone(),
                    });
                }
                if let Some(first) = parent_of.insert(child.as_str(), name.as_str()) {
                    return Err(TutorialError::MultipleParents {
                        child: child.clone(),
                        first: first.to_string(),
                        second: name.clone(),
                    });
                }
            }
        }

        // With at most one parent per node, anything unreachable from a root
        // sits on a cycle.
        let roots: Vec<&String> = order
            .iter()
            .filter(|name| !parent_of.contains_key(name.as_str()))
            .collect();

        let mut reached = HashSet::new();
        let mut stack: Vec<&str> = roots.iter().map(|name| name.as_str()).collect();
        while let Some(name) = stack.pop() {
            if reached.insert(name) {
                stack.extend(by_name[name].children.iter().map(String::as_str));
            }
        }
        if let Some(orphan) = order.iter().find(|name| !reached.contains(name.as_str())) {
            return Err(TutorialError::Cycle(orphan.clone()));
        }

        let children = roots
            .into_iter()
            .map(|name| assemble(name, &by_name))
            .collect();
        Ok(Self { children })
    }

    /// Every tutorial in depth-first pre-order
    pub fn depth_first(&self) -> Vec<&Tutorial> {
        let mut out = Vec::new();
        let mut stack: Vec<&Tutorial> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn assemble(name: &str, by_name: &HashMap<String, TutorialSource>) -> Tutorial {
    let source = &by_name[name];
    Tutorial {
        name: source.name.clone(),
        title: source.title.clone().unwrap_or_else(|| source.name.clone()),
        content: source.content.clone(),
        children: source
            .children
            .iter()
            .map(|child| assemble(child, by_name))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, children: &[&str]) -> TutorialSource {
        TutorialSource {
            name: name.to_string(),
            title: Some(name.to_uppercase()),
            content: format!("<p>{name}</p>"),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_and_walk_pre_order() {
        let tree = TutorialTree::build(vec![
            source("a", &["a1"]),
            source("b", &[]),
            source("a1", &[]),
        ])
        .unwrap();

        assert_eq!(tree.children.len(), 2);
        let names: Vec<_> = tree.depth_first().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "a1", "b"]);
        assert_eq!(tree.depth_first()[1].title, "A1");
    }

    #[test]
    fn test_title_defaults_to_name() {
        let tree = TutorialTree::build(vec![TutorialSource {
            name: "intro".to_string(),
            ..TutorialSource::default()
        }])
        .unwrap();
        assert_eq!(tree.children[0].title, "intro");
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = TutorialTree::build(vec![
            source("root", &[]),
            source("x", &["y"]),
            source("y", &["x"]),
        ])
        .unwrap_err();
        assert!(matches!(err, TutorialError::Cycle(_)));
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let err = TutorialTree::build(vec![source("loop", &["loop"])]).unwrap_err();
        assert_eq!(err, TutorialError::Cycle("loop".to_string()));
    }

    #[test]
    fn test_unknown_child_and_duplicates() {
        let err = TutorialTree::build(vec![source("a", &["missing"])]).unwrap_err();
        assert!(matches!(err, TutorialError::UnknownChild { .. }));

        let err = TutorialTree::build(vec![source("a", &[]), source("a", &[])]).unwrap_err();
        assert_eq!(err, TutorialError::Duplicate("a".to_string()));

        let err = TutorialTree::build(vec![
            source("a", &["c"]),
            source("b", &["c"]),
            source("c", &[]),
        ])
        .unwrap_err();
        assert!(matches!(err, TutorialError::MultipleParents { .. }));
    }
}
