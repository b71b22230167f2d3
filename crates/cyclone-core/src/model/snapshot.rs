//! JSON symbol snapshots
//!
//! A host front end serializes one compilation's resolved symbols as a
//! `*.symbols.json` document; this module turns it back into a
//! [`SymbolModel`]. Names are resolved in two passes so declarations may
//! reference types declared later in the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::trace;

use super::symbols::{
    Location, Marker, MemberDecl, MemberKind, ShapeId, SymbolModel, TypeDecl, TypeId, TypeKind,
};

pub const SNAPSHOT_SUFFIX: &str = ".symbols.json";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid snapshot JSON in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Type '{name}' is declared more than once")]
    DuplicateType { name: String },
    #[error("Member '{member}' of '{type_name}' refers to type parameter #{ordinal}, but the type declares {declared}")]
    InvalidTypeParameter {
        type_name: String,
        member: String,
        ordinal: usize,
        declared: usize,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub compilation: String,
    pub types: Vec<TypeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberEntry {
    pub name: String,
    #[serde(default = "default_member_kind")]
    pub kind: MemberKind,
    #[serde(rename = "type")]
    pub ty: TypeRefEntry,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub location: Location,
}

fn default_member_kind() -> MemberKind {
    MemberKind::Field
}

fn default_rank() -> u32 {
    1
}

/// A type reference as written in a snapshot.
///
/// A bare string is shorthand for `{"named": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeRefEntry {
    Name(String),
    Named {
        named: String,
    },
    Array {
        array: Box<TypeRefEntry>,
        #[serde(default = "default_rank")]
        rank: u32,
    },
    Generic {
        generic: String,
        args: Vec<TypeRefEntry>,
    },
    Param {
        param: usize,
    },
    Unresolved {
        unresolved: String,
    },
}

pub fn load_snapshot(path: &Path) -> Result<SymbolModel, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut snapshot = parse_snapshot(&content, path)?;
    if snapshot.compilation.is_empty() {
        snapshot.compilation = compilation_name_from_path(path);
    }

    build_model(snapshot)
}

pub fn parse_snapshot(content: &str, path: &Path) -> Result<Snapshot, SnapshotError> {
    serde_json::from_str(content).map_err(|e| SnapshotError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn is_snapshot_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(SNAPSHOT_SUFFIX))
        .unwrap_or(false)
}

fn compilation_name_from_path(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.trim_end_matches(SNAPSHOT_SUFFIX).to_string())
        .unwrap_or_default()
}

pub fn build_model(snapshot: Snapshot) -> Result<SymbolModel, SnapshotError> {
    let mut model = SymbolModel::new(snapshot.compilation);
    let mut declared: Vec<TypeId> = Vec::with_capacity(snapshot.types.len());

    for entry in &snapshot.types {
        if model.find_type(&entry.name).is_some() {
            return Err(SnapshotError::DuplicateType {
                name: entry.name.clone(),
            });
        }
        let decl = TypeDecl {
            name: entry.name.clone(),
            kind: entry.kind,
            markers: entry.markers.clone(),
            type_parameters: entry.type_parameters.clone(),
            location: entry.location.clone(),
        };
        declared.push(model.add_type(decl));
    }

    for (entry, &ty) in snapshot.types.iter().zip(&declared) {
        if let Some(base_name) = &entry.base {
            match model.find_type(base_name) {
                Some(base) => model.set_base(ty, base),
                None => trace!(
                    type_name = %entry.name,
                    base = %base_name,
                    "base type not in snapshot, inheritance folding stops here"
                ),
            }
        }

        for member in &entry.members {
            let shape = resolve_ref(&mut model, ty, entry, member, &member.ty)?;
            let decl = MemberDecl {
                name: member.name.clone(),
                kind: member.kind,
                declared_type: shape,
                is_static: member.is_static,
                markers: member.markers.clone(),
                location: member.location.clone(),
            };
            model.add_member(ty, decl);
        }
    }

    Ok(model)
}

fn resolve_ref(
    model: &mut SymbolModel,
    owner: TypeId,
    owner_entry: &TypeEntry,
    member: &MemberEntry,
    reference: &TypeRefEntry,
) -> Result<ShapeId, SnapshotError> {
    let shape = match reference {
        TypeRefEntry::Name(name) | TypeRefEntry::Named { named: name } => {
            match model.find_type(name) {
                Some(ty) => model.named(ty),
                None => {
                    trace!(member = %member.name, name = %name, "unknown type name");
                    model.unresolved()
                }
            }
        }
        TypeRefEntry::Array { array, rank } => {
            let element = resolve_ref(model, owner, owner_entry, member, array)?;
            model.array(element, *rank)
        }
        TypeRefEntry::Generic { generic, args } => {
            let mut resolved = Vec::with_capacity(args.len());
            for arg in args {
                resolved.push(resolve_ref(model, owner, owner_entry, member, arg)?);
            }
            match model.find_type(generic) {
                Some(definition) => model.generic(definition, resolved),
                None => {
                    trace!(member = %member.name, name = %generic, "external generic container");
                    model.external_generic(resolved)
                }
            }
        }
        TypeRefEntry::Param { param } => {
            let declared = owner_entry.type_parameters.len();
            if *param >= declared {
                return Err(SnapshotError::InvalidTypeParameter {
                    type_name: owner_entry.name.clone(),
                    member: member.name.clone(),
                    ordinal: *param,
                    declared,
                });
            }
            model.type_parameter(owner, *param)
        }
        TypeRefEntry::Unresolved { .. } => model.unresolved(),
    };
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeShape;
    use std::fs;

    fn parse(json: &str) -> Result<SymbolModel, SnapshotError> {
        let snapshot = parse_snapshot(json, Path::new("test.symbols.json"))?;
        build_model(snapshot)
    }

    #[test]
    fn parses_minimal_snapshot() {
        let model = parse(
            r#"{
                "compilation": "App",
                "types": [
                    { "name": "Node", "markers": ["serializable"], "members": [
                        { "name": "next", "type": "Node",
                          "location": { "file": "Node.cs", "line": 6, "column": 18 } }
                    ] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(model.compilation(), "App");
        let node = model.find_type("Node").unwrap();
        assert!(model.is_serializable(node));

        let next = model.members_of(node).next().unwrap();
        assert_eq!(next.name, "next");
        assert_eq!(next.kind, MemberKind::Field);
        assert_eq!(next.location, Location::new("Node.cs", 6, 18));
        assert_eq!(model.shape(next.declared_type), &TypeShape::Named(node));
    }

    #[test]
    fn resolves_forward_references_and_bases() {
        let model = parse(
            r#"{ "types": [
                { "name": "Derived", "base": "Base", "markers": ["serializable"] },
                { "name": "Base", "markers": ["serializable"] }
            ] }"#,
        )
        .unwrap();

        let derived = model.find_type("Derived").unwrap();
        let base = model.find_type("Base").unwrap();
        assert_eq!(model.base_type(derived), Some(base));
    }

    #[test]
    fn unknown_base_is_not_an_error() {
        let model = parse(
            r#"{ "types": [
                { "name": "Derived", "base": "System.Object", "markers": ["serializable"] }
            ] }"#,
        )
        .unwrap();

        let derived = model.find_type("Derived").unwrap();
        assert!(model.base_type(derived).is_none());
    }

    #[test]
    fn nested_shapes_are_resolved() {
        let model = parse(
            r#"{ "types": [
                { "name": "List", "type_parameters": ["T"] },
                { "name": "Node", "markers": ["serializable"], "members": [
                    { "name": "children", "kind": "auto_property",
                      "type": { "generic": "List", "args": [ { "array": "Node", "rank": 2 } ] } }
                ] }
            ] }"#,
        )
        .unwrap();

        let list = model.find_type("List").unwrap();
        let node = model.find_type("Node").unwrap();
        let children = model.members_of(node).next().unwrap();
        assert_eq!(children.kind, MemberKind::AutoProperty);

        let TypeShape::Generic { definition, args } = model.shape(children.declared_type) else {
            panic!("expected generic shape");
        };
        assert_eq!(*definition, Some(list));
        assert_eq!(args.len(), 1);

        let TypeShape::Array { element, rank } = model.shape(args[0]) else {
            panic!("expected array shape");
        };
        assert_eq!(*rank, 2);
        assert_eq!(model.shape(*element), &TypeShape::Named(node));
    }

    #[test]
    fn unknown_names_become_unresolved() {
        let model = parse(
            r#"{ "types": [
                { "name": "Node", "markers": ["serializable"], "members": [
                    { "name": "a", "type": "Missing" },
                    { "name": "c", "type": { "unresolved": "Broken<" } }
                ] }
            ] }"#,
        )
        .unwrap();

        let node = model.find_type("Node").unwrap();
        for member in model.members_of(node) {
            assert_eq!(
                model.shape(member.declared_type),
                &TypeShape::Unresolved,
                "member {} should be unresolved",
                member.name
            );
        }
    }

    #[test]
    fn undeclared_generic_container_keeps_its_arguments() {
        let model = parse(
            r#"{ "types": [
                { "name": "Node", "markers": ["serializable"], "members": [
                    { "name": "children",
                      "type": { "generic": "System.Collections.Generic.List", "args": ["Node"] } }
                ] }
            ] }"#,
        )
        .unwrap();

        let node = model.find_type("Node").unwrap();
        let children = model.members_of(node).next().unwrap();

        let TypeShape::Generic { definition, args } = model.shape(children.declared_type) else {
            panic!("expected generic shape");
        };
        assert_eq!(*definition, None);
        assert_eq!(args.len(), 1);
        assert_eq!(model.shape(args[0]), &TypeShape::Named(node));
    }

    #[test]
    fn type_parameters_refer_to_owner() {
        let model = parse(
            r#"{ "types": [
                { "name": "Box", "type_parameters": ["T"], "markers": ["serializable"], "members": [
                    { "name": "value", "type": { "param": 0 } }
                ] }
            ] }"#,
        )
        .unwrap();

        let boxed = model.find_type("Box").unwrap();
        let value = model.members_of(boxed).next().unwrap();
        assert_eq!(
            model.shape(value.declared_type),
            &TypeShape::TypeParameter {
                owner: boxed,
                ordinal: 0
            }
        );
    }

    #[test]
    fn out_of_range_type_parameter_is_rejected() {
        let err = parse(
            r#"{ "types": [
                { "name": "Box", "type_parameters": ["T"], "members": [
                    { "name": "value", "type": { "param": 3 } }
                ] }
            ] }"#,
        )
        .unwrap_err();

        match err {
            SnapshotError::InvalidTypeParameter {
                type_name,
                ordinal,
                declared,
                ..
            } => {
                assert_eq!(type_name, "Box");
                assert_eq!(ordinal, 3);
                assert_eq!(declared, 1);
            }
            other => panic!("Expected InvalidTypeParameter, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let err = parse(r#"{ "types": [ { "name": "A" }, { "name": "A" } ] }"#).unwrap_err();

        assert!(matches!(err, SnapshotError::DuplicateType { name } if name == "A"));
    }

    #[test]
    fn static_and_markers_are_read() {
        let model = parse(
            r#"{ "types": [
                { "name": "Node", "markers": ["serializable"], "members": [
                    { "name": "shared", "type": "Node", "static": true },
                    { "name": "cache", "type": "Node", "markers": ["non_serialized"] }
                ] }
            ] }"#,
        )
        .unwrap();

        let node = model.find_type("Node").unwrap();
        let members: Vec<_> = model.members_of(node).collect();
        assert!(members[0].is_static);
        assert!(members[1].is_excluded());
    }

    #[test]
    fn invalid_json_reports_path() {
        let err = parse_snapshot("{ not json", Path::new("broken.symbols.json")).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("broken.symbols.json"));
    }

    #[test]
    fn load_snapshot_uses_file_stem_as_compilation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Billing.symbols.json");
        fs::write(&path, r#"{ "types": [] }"#).unwrap();

        let model = load_snapshot(&path).unwrap();

        assert_eq!(model.compilation(), "Billing");
    }

    #[test]
    fn load_snapshot_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.symbols.json");

        let err = load_snapshot(&path).unwrap_err();

        assert!(matches!(err, SnapshotError::ReadError { .. }));
    }

    #[test]
    fn is_snapshot_file_checks_suffix() {
        assert!(is_snapshot_file(Path::new("out/App.symbols.json")));
        assert!(!is_snapshot_file(Path::new("out/App.json")));
        assert!(!is_snapshot_file(Path::new("out/symbols.json.bak")));
    }
}
