//! End-to-end test: a movement system integrating velocity into position.

use strata_core::{EcsResult, Engine, FieldType, QueryId, QueryTerm, Schema, StoreId, WorldId};

const DELTA: f32 = 100.0;

fn movement_system(
    engine: &mut Engine,
    world: WorldId,
    query: QueryId,
    position: StoreId,
    velocity: StoreId,
    delta: f32,
) -> EcsResult<()> {
    let (entities, stores) = engine.query_with_stores(world, query)?;
    let (pos, vel) = stores.get_pair_mut(position, velocity)?;
    let [px, py, pz] = pos.scalars_mut::<f32, 3>(["x", "y", "z"])?;
    let [vx, vy, vz] = vel.scalars::<f32, 3>(["x", "y", "z"])?;
    for &eid in entities {
        let i = eid as usize;
        px[i] += vx[i] * delta;
        py[i] += vy[i] * delta;
        pz[i] += vz[i] * delta;
    }
    Ok(())
}

#[test]
fn test_two_ticks_reach_246() {
    let mut engine = Engine::with_defaults();
    let position = engine.define_component(&Schema::vector3(FieldType::F32)).unwrap();
    let velocity = engine.define_component(&Schema::vector3(FieldType::F32)).unwrap();
    let movement = engine
        .define_query([QueryTerm::With(position), QueryTerm::With(velocity)])
        .unwrap();

    let world = engine.create_world().unwrap();
    let eid = engine.add_entity(world).unwrap();
    engine.add_component(world, position, eid).unwrap();
    engine.add_component(world, velocity, eid).unwrap();
    {
        let [vx, vy, vz] = engine
            .store_mut(velocity)
            .unwrap()
            .scalars_mut::<f32, 3>(["x", "y", "z"])
            .unwrap();
        vx[eid as usize] = 1.23;
        vy[eid as usize] = 1.23;
        vz[eid as usize] = 0.0;
    }

    for _ in 0..2 {
        movement_system(&mut engine, world, movement, position, velocity, DELTA).unwrap();
    }

    let [x, y, z] = engine
        .store(position)
        .unwrap()
        .scalars::<f32, 3>(["x", "y", "z"])
        .unwrap();
    let i = eid as usize;
    assert!((x[i] - 246.0).abs() < 1e-3, "x = {}", x[i]);
    assert!((y[i] - 246.0).abs() < 1e-3, "y = {}", y[i]);
    assert!(z[i].abs() < f32::EPSILON);
}

#[test]
fn test_schemas_from_toml() {
    let mut engine = Engine::with_defaults();
    let body = engine
        .define_component(
            &Schema::from_toml_str(
                r#"
                mass = "f32"

                [velocity]
                x = "f32"
                y = "f32"
                "#,
            )
            .unwrap(),
        )
        .unwrap();
    let movers = engine.define_query([QueryTerm::With(body)]).unwrap();
    let world = engine.create_world().unwrap();
    let eid = engine.add_entity(world).unwrap();
    engine.add_component(world, body, eid).unwrap();

    let (entities, stores) = engine.query_with_stores(world, movers).unwrap();
    let store = stores.get_mut(body).unwrap();
    for &eid in entities {
        store.scalar_mut::<f32>("velocity.y").unwrap()[eid as usize] = 9.5;
    }
    assert!((store.scalar::<f32>("velocity.y").unwrap()[eid as usize] - 9.5).abs() < f32::EPSILON);
    assert!(store.scalar::<f32>("velocity.z").is_err());
}

#[test]
fn test_remove_component_zeroes_by_default() {
    let mut engine = Engine::with_defaults();
    let position = engine.define_component(&Schema::vector3(FieldType::F32)).unwrap();
    let world = engine.create_world().unwrap();
    let eid = engine.add_entity(world).unwrap();
    let i = eid as usize;

    engine.add_component(world, position, eid).unwrap();
    engine.store_mut(position).unwrap().scalar_mut::<f32>("x").unwrap()[i] = 5.0;
    engine.remove_component_keep_data(world, position, eid).unwrap();
    assert!((engine.store(position).unwrap().scalar::<f32>("x").unwrap()[i] - 5.0).abs() < f32::EPSILON);

    engine.add_component(world, position, eid).unwrap();
    assert!((engine.store(position).unwrap().scalar::<f32>("x").unwrap()[i] - 5.0).abs() < f32::EPSILON);
    engine.remove_component(world, position, eid).unwrap();
    assert!(engine.store(position).unwrap().scalar::<f32>("x").unwrap()[i].abs() < f32::EPSILON);

    engine.store_mut(position).unwrap().scalar_mut::<f32>("x").unwrap()[i] = 3.0;
    engine.add_component_zeroed(world, position, eid).unwrap();
    assert!(engine.store(position).unwrap().scalar::<f32>("x").unwrap()[i].abs() < f32::EPSILON);
    assert_eq!(engine.entity_components(world, eid).unwrap(), &[position]);
}
