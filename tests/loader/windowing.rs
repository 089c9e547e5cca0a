use epochweave_cache::{GraphCaches, KeyframeManager};
use epochweave_foundation::Value;
use epochweave_loader::Loader;
use epochweave_persist::{Backend, GraphRow, KeyframeRow, MemoryBackend, NodeRow, NodeValRow};
use epochweave_storage::{GraphKind, GraphState};
use epochweave_timeline::{BranchId, BranchInfo};

fn v(s: &str) -> Value {
    Value::from(s)
}

fn b() -> BranchId {
    BranchId::trunk()
}

fn root_info(_: &BranchId) -> Option<BranchInfo> {
    Some(BranchInfo::root())
}

fn seeded_backend() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend
        .new_graph(GraphRow {
            graph: v("physical"),
            kind: GraphKind::Directed,
        })
        .unwrap();
    backend
        .keyframes_insert(KeyframeRow {
            graph: v("physical"),
            branch: "trunk".into(),
            turn: 0,
            tick: 0,
            state: GraphState::new(),
        })
        .unwrap();
    for (turn, tick) in [(0u64, 1u64), (1, 1), (2, 1)] {
        backend
            .set_node(NodeRow {
                graph: v("physical"),
                node: v("A"),
                branch: "trunk".into(),
                turn,
                tick,
                exists: true,
            })
            .unwrap();
        backend
            .set_node_val(NodeValRow {
                graph: v("physical"),
                node: v("A"),
                key: v("turn"),
                branch: "trunk".into(),
                turn,
                tick,
                value: Value::Int(turn as i64),
            })
            .unwrap();
    }
    backend
}

#[test]
fn load_at_then_unload_then_reload_produces_the_same_cached_value() {
    let backend = seeded_backend();
    let mut caches = GraphCaches::new();
    let mut keyframes = KeyframeManager::new();
    let mut loader = Loader::new();

    loader
        .load_at(&backend, &mut caches, &mut keyframes, &v("physical"), &b(), 2, 1, false, &root_info)
        .unwrap();
    assert_eq!(
        caches.node_val.latest_write(&b(), 2, 1, &(v("A"), v("turn"))),
        Some(Value::Int(2))
    );

    loader.unload(&mut caches, &mut keyframes, &v("physical"), &b(), (2, 1), (2, 1), &[]);

    // The only keyframe is at (0, 0), so unload can't shrink past it; a
    // reload inside that window must still recover the right value.
    loader
        .load_at(&backend, &mut caches, &mut keyframes, &v("physical"), &b(), 1, 1, false, &root_info)
        .unwrap();
    assert_eq!(
        caches.node_val.latest_write(&b(), 1, 1, &(v("A"), v("turn"))),
        Some(Value::Int(1))
    );
}

#[test]
fn note_write_then_load_at_within_the_widened_window_is_a_no_op() {
    let backend = seeded_backend();
    let mut caches = GraphCaches::new();
    let mut keyframes = KeyframeManager::new();
    let mut loader = Loader::new();

    loader
        .load_at(&backend, &mut caches, &mut keyframes, &v("physical"), &b(), 1, 1, false, &root_info)
        .unwrap();
    loader.note_write(&b(), 5, 0);

    assert_eq!(loader.loaded_window(&b()).unwrap(), (0, 0, 5, 0));

    // Already inside the widened window: load_at must not error or double-load.
    loader
        .load_at(&backend, &mut caches, &mut keyframes, &v("physical"), &b(), 3, 0, false, &root_info)
        .unwrap();
}
