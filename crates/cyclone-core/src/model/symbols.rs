//! Arena-backed symbol model for one compilation
//!
//! Types, members and interned type shapes are allocated in `id_arena`
//! arenas; their ids double as the identities used by the cycle analysis.

use std::collections::HashMap;

use id_arena::{Arena, Id};
use serde::{Deserialize, Serialize};

pub type TypeId = Id<TypeSymbol>;
pub type MemberId = Id<MemberSymbol>;
pub type ShapeId = Id<TypeShape>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// Capability markers attached to a symbol by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Serializable,
    NonSerialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Primitive,
}

impl TypeKind {
    pub fn carries_data(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Struct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    /// Property with compiler-generated backing storage.
    AutoProperty,
    /// Property whose accessors compute a value without a backing slot.
    ComputedProperty,
}

impl MemberKind {
    pub fn is_property(&self) -> bool {
        matches!(self, MemberKind::AutoProperty | MemberKind::ComputedProperty)
    }
}

/// The structural form of a type reference as written on a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Named(TypeId),
    Array { element: ShapeId, rank: u32 },
    /// `definition` is `None` when the container comes from outside the
    /// snapshot, e.g. a framework collection.
    Generic {
        definition: Option<TypeId>,
        args: Vec<ShapeId>,
    },
    TypeParameter { owner: TypeId, ordinal: usize },
    Unresolved,
}

#[derive(Debug)]
pub struct TypeSymbol {
    pub id: TypeId,
    pub name: String,
    pub kind: TypeKind,
    pub markers: Vec<Marker>,
    pub base: Option<TypeId>,
    pub type_parameters: Vec<String>,
    pub members: Vec<MemberId>,
    pub location: Option<Location>,
}

impl TypeSymbol {
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn is_generic_definition(&self) -> bool {
        !self.type_parameters.is_empty()
    }
}

#[derive(Debug)]
pub struct MemberSymbol {
    pub id: MemberId,
    pub name: String,
    pub kind: MemberKind,
    pub declaring_type: TypeId,
    pub declared_type: ShapeId,
    pub is_static: bool,
    pub markers: Vec<Marker>,
    pub location: Location,
}

impl MemberSymbol {
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn is_excluded(&self) -> bool {
        self.has_marker(Marker::NonSerialized)
    }
}

/// Declaration of a type before it is allocated in a [`SymbolModel`].
#[derive(Debug, Clone, Default)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub markers: Vec<Marker>,
    pub type_parameters: Vec<String>,
    pub location: Option<Location>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn serializable(mut self) -> Self {
        if !self.markers.contains(&Marker::Serializable) {
            self.markers.push(Marker::Serializable);
        }
        self
    }

    pub fn with_type_parameters(mut self, params: &[&str]) -> Self {
        self.type_parameters = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: usize, column: usize) -> Self {
        self.location = Some(Location::new(file, line, column));
        self
    }
}

/// Declaration of a member before it is attached to its declaring type.
#[derive(Debug, Clone)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    pub declared_type: ShapeId,
    pub is_static: bool,
    pub markers: Vec<Marker>,
    pub location: Location,
}

impl MemberDecl {
    pub fn new(name: impl Into<String>, kind: MemberKind, declared_type: ShapeId) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type,
            is_static: false,
            markers: Vec::new(),
            location: Location::default(),
        }
    }

    pub fn field(name: impl Into<String>, declared_type: ShapeId) -> Self {
        Self::new(name, MemberKind::Field, declared_type)
    }

    pub fn auto_property(name: impl Into<String>, declared_type: ShapeId) -> Self {
        Self::new(name, MemberKind::AutoProperty, declared_type)
    }

    pub fn computed_property(name: impl Into<String>, declared_type: ShapeId) -> Self {
        Self::new(name, MemberKind::ComputedProperty, declared_type)
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn non_serialized(mut self) -> Self {
        if !self.markers.contains(&Marker::NonSerialized) {
            self.markers.push(Marker::NonSerialized);
        }
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: usize, column: usize) -> Self {
        self.location = Location::new(file, line, column);
        self
    }
}

/// One immutable snapshot of a compilation's symbols.
///
/// Built once by the host (or by [`crate::model::snapshot`]) and only read
/// during analysis, so it can be shared freely across worker threads.
#[derive(Debug)]
pub struct SymbolModel {
    compilation: String,
    types: Arena<TypeSymbol>,
    members: Arena<MemberSymbol>,
    shapes: Arena<TypeShape>,
    interned: HashMap<TypeShape, ShapeId>,
    names: HashMap<String, TypeId>,
}

impl Default for SymbolModel {
    fn default() -> Self {
        Self::new("")
    }
}

impl SymbolModel {
    pub fn new(compilation: impl Into<String>) -> Self {
        Self {
            compilation: compilation.into(),
            types: Arena::new(),
            members: Arena::new(),
            shapes: Arena::new(),
            interned: HashMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn compilation(&self) -> &str {
        &self.compilation
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> TypeId {
        let name = decl.name.clone();
        let id = self.types.alloc_with_id(|id| TypeSymbol {
            id,
            name: decl.name,
            kind: decl.kind,
            markers: decl.markers,
            base: None,
            type_parameters: decl.type_parameters,
            members: Vec::new(),
            location: decl.location,
        });
        self.names.entry(name).or_insert(id);
        id
    }

    pub fn set_base(&mut self, ty: TypeId, base: TypeId) {
        self.types[ty].base = Some(base);
    }

    pub fn add_member(&mut self, owner: TypeId, decl: MemberDecl) -> MemberId {
        let id = self.members.alloc_with_id(|id| MemberSymbol {
            id,
            name: decl.name,
            kind: decl.kind,
            declaring_type: owner,
            declared_type: decl.declared_type,
            is_static: decl.is_static,
            markers: decl.markers,
            location: decl.location,
        });
        self.types[owner].members.push(id);
        id
    }

    /// Interns a shape, returning the existing id for a structurally equal one.
    pub fn intern(&mut self, shape: TypeShape) -> ShapeId {
        if let Some(&id) = self.interned.get(&shape) {
            return id;
        }
        let id = self.shapes.alloc(shape.clone());
        self.interned.insert(shape, id);
        id
    }

    pub fn named(&mut self, ty: TypeId) -> ShapeId {
        self.intern(TypeShape::Named(ty))
    }

    pub fn array(&mut self, element: ShapeId, rank: u32) -> ShapeId {
        self.intern(TypeShape::Array {
            element,
            rank: rank.max(1),
        })
    }

    pub fn generic(&mut self, definition: TypeId, args: Vec<ShapeId>) -> ShapeId {
        self.intern(TypeShape::Generic {
            definition: Some(definition),
            args,
        })
    }

    /// Instantiation of a generic container not declared in this model.
    pub fn external_generic(&mut self, args: Vec<ShapeId>) -> ShapeId {
        self.intern(TypeShape::Generic {
            definition: None,
            args,
        })
    }

    pub fn type_parameter(&mut self, owner: TypeId, ordinal: usize) -> ShapeId {
        self.intern(TypeShape::TypeParameter { owner, ordinal })
    }

    pub fn unresolved(&mut self) -> ShapeId {
        self.intern(TypeShape::Unresolved)
    }

    pub fn get_type(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id]
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        &self.members[id]
    }

    pub fn shape(&self, id: ShapeId) -> &TypeShape {
        &self.shapes[id]
    }

    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.types.iter().map(|(_, ty)| ty)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members_of(&self, id: TypeId) -> impl Iterator<Item = &MemberSymbol> {
        self.types[id].members.iter().map(|&m| &self.members[m])
    }

    pub fn base_type(&self, id: TypeId) -> Option<TypeId> {
        self.types[id].base
    }

    /// A type takes part in the analysis only when it carries data and the
    /// host marked it serializable.
    pub fn is_serializable(&self, id: TypeId) -> bool {
        let ty = &self.types[id];
        ty.kind.carries_data() && ty.has_marker(Marker::Serializable)
    }

    pub fn serializable_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types
            .iter()
            .map(|(id, _)| id)
            .filter(|&id| self.is_serializable(id))
    }

    #[cfg(test)]
    pub(crate) fn overwrite_shape(&mut self, id: ShapeId, shape: TypeShape) {
        self.shapes[id] = shape;
    }
}
