pub mod snapshot;
pub mod symbols;

pub use snapshot::{
    SNAPSHOT_SUFFIX, Snapshot, SnapshotError, build_model, is_snapshot_file, load_snapshot,
    parse_snapshot,
};
pub use symbols::{
    Location, Marker, MemberDecl, MemberId, MemberKind, MemberSymbol, ShapeId, SymbolModel,
    TypeDecl, TypeId, TypeKind, TypeShape, TypeSymbol,
};
