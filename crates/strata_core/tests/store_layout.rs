//! Integration tests for store layout, resizing and the registry.

use strata_core::{EcsError, FieldType, LeafKind, Schema, StoreRegistry};

fn transform() -> Schema {
    Schema::shape([
        (
            "transform",
            Schema::shape([
                ("position", Schema::vector3(FieldType::F32)),
                ("rotation", Schema::array(FieldType::F32, 4)),
            ]),
        ),
        ("velocity", Schema::array(FieldType::F32, 3)),
        ("team", Schema::scalar(FieldType::U8Clamped)),
        ("target", Schema::scalar(FieldType::Eid)),
    ])
}

#[test]
fn test_tag_store_never_allocates_columns() {
    let mut registry = StoreRegistry::new();
    let tag = registry.create(&Schema::tag(), 1_000).unwrap();
    let store = registry.get(tag).unwrap();
    assert!(store.is_tag());
    assert_eq!(store.field_paths().count(), 0);
    assert!(matches!(store.scalar::<u8>("x"), Err(EcsError::UnknownField(_))));
}

#[test]
fn test_nested_paths_and_shared_arena() {
    let mut registry = StoreRegistry::new();
    let id = registry.create(&transform(), 10).unwrap();
    let store = registry.get(id).unwrap();

    let paths: Vec<_> = store.field_paths().collect();
    assert_eq!(
        paths,
        [
            "transform.position.x",
            "transform.position.y",
            "transform.position.z",
            "transform.rotation",
            "velocity",
            "team",
            "target",
        ]
    );
    assert_eq!(store.field_type("target").unwrap(), FieldType::Eid);
    assert_eq!(store.scalar::<u32>("target").unwrap().len(), 10);

    let regions: Vec<_> = store
        .leaves()
        .iter()
        .filter_map(|leaf| match leaf.kind() {
            LeafKind::Array { region, .. } => Some(region),
            LeafKind::Scalar { .. } => None,
        })
        .collect();
    assert_eq!(regions[0].offset, 0);
    assert_eq!(regions[0].len, 40);
    assert_eq!(regions[1].offset, 40);
    assert_eq!(regions[1].len, 30);
}

#[test]
fn test_resize_preserves_every_entity() {
    let mut registry = StoreRegistry::new();
    let id = registry.create(&transform(), 10).unwrap();
    {
        let store = registry.get_mut(id).unwrap();
        for eid in 0..10u8 {
            let i = usize::from(eid);
            let value = f32::from(eid);
            store.scalar_mut::<f32>("transform.position.y").unwrap()[i] = value;
            store.array_mut::<f32>("transform.rotation").unwrap()[i].fill(value);
            store.array_mut::<f32>("velocity").unwrap()[i].copy_from_slice(&[value, -value, 1.0]);
            store.scalar_mut::<u8>("team").unwrap()[i] = eid;
        }
    }

    registry.resize_all(25);
    let store = registry.get(id).unwrap();
    assert_eq!(store.size(), 25);
    for eid in 0..10u8 {
        let i = usize::from(eid);
        let value = f32::from(eid);
        assert_eq!(store.scalar::<f32>("transform.position.y").unwrap()[i], value);
        assert_eq!(&store.array::<f32>("transform.rotation").unwrap()[i], &[value; 4]);
        assert_eq!(&store.array::<f32>("velocity").unwrap()[i], &[value, -value, 1.0]);
        assert_eq!(store.scalar::<u8>("team").unwrap()[i], eid);
    }
    for i in 10..25 {
        assert_eq!(&store.array::<f32>("transform.rotation").unwrap()[i], &[0.0; 4]);
        assert_eq!(&store.array::<f32>("velocity").unwrap()[i], &[0.0; 3]);
    }
}

#[test]
fn test_reset_for_zeroes_one_entity() {
    let mut registry = StoreRegistry::new();
    let id = registry.create(&transform(), 4).unwrap();
    let store = registry.get_mut(id).unwrap();
    store.array_mut::<f32>("velocity").unwrap().parent_mut().fill(2.0);
    store.scalar_mut::<u32>("target").unwrap().fill(9);

    store.reset_for(1);
    store.reset_for(99);
    assert_eq!(&store.array::<f32>("velocity").unwrap()[1], &[0.0; 3]);
    assert_eq!(&store.array::<f32>("velocity").unwrap()[2], &[2.0; 3]);
    assert_eq!(store.scalar::<u32>("target").unwrap(), &[9, 0, 9, 9]);

    store.reset();
    assert_eq!(store.scalar::<u32>("target").unwrap(), &[0; 4]);
}

#[test]
fn test_schema_errors() {
    let mut registry = StoreRegistry::new();
    assert!(matches!(
        Schema::from_toml_str("v = [\"f32\"]"),
        Err(EcsError::MissingArrayLength { .. })
    ));
    assert!(matches!(
        Schema::from_toml_str("v = \"int\""),
        Err(EcsError::UnknownFieldType { .. })
    ));
    assert!(registry
        .create(&Schema::shape([("v", Schema::array(FieldType::I8, 0))]), 4)
        .is_err());
}

#[test]
fn test_freed_store_is_handed_back() {
    let mut registry = StoreRegistry::new();
    let id = registry.create(&Schema::vector3(FieldType::I32), 4).unwrap();
    registry.get_mut(id).unwrap().scalar_mut::<i32>("x").unwrap()[2] = 42;

    let freed = registry.free(id).unwrap();
    assert_eq!(freed.scalar::<i32>("x").unwrap()[2], 42);
    assert!(matches!(registry.get(id), Err(EcsError::UnknownStore(_))));
    assert!(registry.is_empty());
}
