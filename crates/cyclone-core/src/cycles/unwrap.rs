//! Transparent unwrapping of type references
//!
//! Arrays and generic containers are looked through: a member typed
//! `List<Node[]>` points at `Node`, never at `List` or the array.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::model::{ShapeId, SymbolModel, TypeId, TypeShape};

/// Per-run memo of shape to successor types.
///
/// Each worker owns its own instance; the memo is never shared.
#[derive(Debug, Default)]
pub struct Unwrapper {
    memo: HashMap<ShapeId, Vec<TypeId>>,
}

impl Unwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializable types reachable through `shape`, sorted by identity.
    pub fn targets(&mut self, model: &SymbolModel, shape: ShapeId) -> &[TypeId] {
        self.memo
            .entry(shape)
            .or_insert_with(|| unwrap_shape(model, shape))
    }

    pub fn cached(&self) -> usize {
        self.memo.len()
    }
}

pub fn unwrap_shape(model: &SymbolModel, root: ShapeId) -> Vec<TypeId> {
    let mut targets = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![root];

    while let Some(shape) = pending.pop() {
        if !visited.insert(shape) {
            continue;
        }

        match model.shape(shape) {
            TypeShape::Named(ty) => {
                if model.is_serializable(*ty) {
                    targets.push(*ty);
                }
            }
            TypeShape::Array { element, .. } => pending.push(*element),
            TypeShape::Generic { definition, args } => match definition {
                Some(definition) if is_open_self_instantiation(model, *definition, args) => {
                    if model.is_serializable(*definition) {
                        targets.push(*definition);
                    }
                }
                _ => pending.extend(args.iter().rev().copied()),
            },
            TypeShape::TypeParameter { .. } => {}
            TypeShape::Unresolved => trace!("unresolved type reference treated as leaf"),
        }
    }

    targets.sort_by_key(|ty| ty.index());
    targets.dedup();
    targets
}

/// `Node<T>` written inside `Node<T>` names the definition itself.
fn is_open_self_instantiation(model: &SymbolModel, definition: TypeId, args: &[ShapeId]) -> bool {
    let params = model.get_type(definition).type_parameters.len();
    if params == 0 || args.len() != params {
        return false;
    }

    args.iter().enumerate().all(|(position, &arg)| {
        matches!(
            model.shape(arg),
            TypeShape::TypeParameter { owner, ordinal } if *owner == definition && *ordinal == position
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDecl, TypeKind};

    struct Fixture {
        model: SymbolModel,
        node: TypeId,
        plain: TypeId,
        list: TypeId,
        dict: TypeId,
    }

    fn fixture() -> Fixture {
        let mut model = SymbolModel::new("test");
        let node = model.add_type(TypeDecl::class("Node").serializable());
        let plain = model.add_type(TypeDecl::class("Plain"));
        let list = model.add_type(TypeDecl::class("List").with_type_parameters(&["T"]));
        let dict = model.add_type(TypeDecl::class("Dictionary").with_type_parameters(&["K", "V"]));
        Fixture {
            model,
            node,
            plain,
            list,
            dict,
        }
    }

    #[test]
    fn named_serializable_type_is_target() {
        let mut f = fixture();
        let shape = f.model.named(f.node);

        assert_eq!(unwrap_shape(&f.model, shape), vec![f.node]);
    }

    #[test]
    fn named_plain_type_is_leaf() {
        let mut f = fixture();
        let shape = f.model.named(f.plain);

        assert!(unwrap_shape(&f.model, shape).is_empty());
    }

    #[test]
    fn enum_with_marker_is_leaf() {
        let mut f = fixture();
        let color = f
            .model
            .add_type(TypeDecl::new("Color", TypeKind::Enum).serializable());
        let shape = f.model.named(color);

        assert!(unwrap_shape(&f.model, shape).is_empty());
    }

    #[test]
    fn arrays_and_jagged_arrays_unwrap_to_element() {
        let mut f = fixture();
        let node_ref = f.model.named(f.node);
        let matrix = f.model.array(node_ref, 2);
        let jagged_inner = f.model.array(node_ref, 1);
        let jagged = f.model.array(jagged_inner, 1);

        assert_eq!(unwrap_shape(&f.model, matrix), vec![f.node]);
        assert_eq!(unwrap_shape(&f.model, jagged), vec![f.node]);
    }

    #[test]
    fn nested_generics_unwrap_to_innermost_argument() {
        let mut f = fixture();
        let node_ref = f.model.named(f.node);
        let inner = f.model.generic(f.list, vec![node_ref]);
        let middle = f.model.generic(f.list, vec![inner]);
        let outer = f.model.generic(f.list, vec![middle]);

        assert_eq!(unwrap_shape(&f.model, outer), vec![f.node]);
    }

    #[test]
    fn external_container_arguments_are_followed() {
        let mut f = fixture();
        let node_ref = f.model.named(f.node);
        let inner = f.model.external_generic(vec![node_ref]);
        let outer = f.model.external_generic(vec![inner]);

        assert_eq!(unwrap_shape(&f.model, outer), vec![f.node]);
    }

    #[test]
    fn generic_arguments_are_unioned() {
        let mut f = fixture();
        let other = f.model.add_type(TypeDecl::class("Other").serializable());
        let node_ref = f.model.named(f.node);
        let other_ref = f.model.named(other);
        let plain_ref = f.model.named(f.plain);
        let both = f.model.generic(f.dict, vec![node_ref, other_ref]);
        let key_only = f.model.generic(f.dict, vec![node_ref, plain_ref]);

        assert_eq!(unwrap_shape(&f.model, both), vec![f.node, other]);
        assert_eq!(unwrap_shape(&f.model, key_only), vec![f.node]);
    }

    #[test]
    fn serializable_container_is_not_a_target() {
        let mut f = fixture();
        let bag = f.model.add_type(
            TypeDecl::class("Bag")
                .serializable()
                .with_type_parameters(&["T"]),
        );
        let plain_ref = f.model.named(f.plain);
        let shape = f.model.generic(bag, vec![plain_ref]);

        assert!(unwrap_shape(&f.model, shape).is_empty());
    }

    #[test]
    fn open_self_instantiation_names_the_definition() {
        let mut f = fixture();
        let tree = f.model.add_type(
            TypeDecl::class("Tree")
                .serializable()
                .with_type_parameters(&["T"]),
        );
        let param = f.model.type_parameter(tree, 0);
        let shape = f.model.generic(tree, vec![param]);

        assert_eq!(unwrap_shape(&f.model, shape), vec![tree]);
    }

    #[test]
    fn foreign_type_parameter_is_not_self_instantiation() {
        let mut f = fixture();
        let tree = f.model.add_type(
            TypeDecl::class("Tree")
                .serializable()
                .with_type_parameters(&["T"]),
        );
        let holder = f.model.add_type(
            TypeDecl::class("Holder")
                .serializable()
                .with_type_parameters(&["U"]),
        );
        let param = f.model.type_parameter(holder, 0);
        let shape = f.model.generic(tree, vec![param]);

        assert!(unwrap_shape(&f.model, shape).is_empty());
    }

    #[test]
    fn type_parameter_and_unresolved_are_leaves() {
        let mut f = fixture();
        let param = f.model.type_parameter(f.list, 0);
        let unresolved = f.model.unresolved();

        assert!(unwrap_shape(&f.model, param).is_empty());
        assert!(unwrap_shape(&f.model, unresolved).is_empty());
    }

    #[test]
    fn self_referential_shape_terminates() {
        let mut f = fixture();
        let node_ref = f.model.named(f.node);
        let looping = f.model.generic(f.list, vec![node_ref]);
        f.model.overwrite_shape(
            looping,
            TypeShape::Generic {
                definition: Some(f.dict),
                args: vec![looping, node_ref],
            },
        );

        assert_eq!(unwrap_shape(&f.model, looping), vec![f.node]);
    }

    #[test]
    fn unwrapper_memoizes_per_root_shape() {
        let mut f = fixture();
        let node_ref = f.model.named(f.node);
        let list_of_nodes = f.model.generic(f.list, vec![node_ref]);

        let mut unwrapper = Unwrapper::new();
        assert_eq!(unwrapper.targets(&f.model, list_of_nodes), &[f.node]);
        assert_eq!(unwrapper.targets(&f.model, list_of_nodes), &[f.node]);
        assert_eq!(unwrapper.targets(&f.model, node_ref), &[f.node]);
        assert_eq!(unwrapper.cached(), 2);
    }
}
