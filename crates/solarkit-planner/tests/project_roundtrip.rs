//! Integration tests for project save/load.
//!
//! Stored panel positions are authoritative: a load must reproduce the
//! committed layout bit-for-bit without re-running the layout engine.

use solarkit_planner::{
    GridConfig, LayoutEngine, ModuleCatalog, PanelInstance, PlacementStore, Point, Polygon,
    ProjectFile, RoofProvenance,
};

fn rect_poly(w: f64, h: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ])
}

fn committed_project() -> (PlacementStore, ModuleCatalog, u64) {
    let mut store = PlacementStore::new();
    let catalog = ModuleCatalog::with_defaults();
    let roof = store.add_roof(rect_poly(10.0, 6.0), 0.0, 35.0, RoofProvenance::Imported);
    store
        .set_roof_config(
            roof,
            GridConfig {
                module_id: Some("mono-410".into()),
                ..GridConfig::default()
            },
        )
        .unwrap();
    store
        .add_zone(
            roof,
            Polygon::new(vec![
                Point::new(4.0, 2.0),
                Point::new(5.0, 2.0),
                Point::new(5.0, 3.0),
                Point::new(4.0, 3.0),
            ]),
        )
        .unwrap();
    LayoutEngine::commit(&mut store, &catalog, roof).unwrap();
    (store, catalog, roof)
}

#[test]
fn save_and_load_round_trips_verbatim() {
    let (store, catalog, roof) = committed_project();
    let panels_before: Vec<PanelInstance> = store.panels().cloned().collect();
    assert!(!panels_before.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.skp.json");

    let file = ProjectFile::from_store("Roundtrip", &store, &catalog);
    file.save_to_file(&path).unwrap();

    let loaded = ProjectFile::load_from_file(&path).unwrap();
    let (restored_store, restored_catalog) = loaded.restore();

    // Panel list is identical down to every f64; no regeneration ran.
    let panels_after: Vec<PanelInstance> = restored_store.panels().cloned().collect();
    assert_eq!(panels_before, panels_after);

    // Entity relations survive.
    assert_eq!(restored_store.panel_count(roof), panels_before.len());
    assert_eq!(restored_store.zones_on_roof(roof).count(), 1);
    assert_eq!(
        restored_store.config_for(roof).module_id,
        Some("mono-410".into())
    );
    assert_eq!(restored_catalog.len(), catalog.len());
}

#[test]
fn moved_panels_stay_moved_across_reload() {
    let (mut store, catalog, _roof) = committed_project();
    let first_id = store.panels().next().unwrap().id;
    // A hand-placed override position, away from any grid cell.
    store
        .set_panel_center(first_id, Point::new(4.321, 1.234))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moved.skp.json");
    ProjectFile::from_store("Moved", &store, &catalog)
        .save_to_file(&path)
        .unwrap();

    let (restored, _) = ProjectFile::load_from_file(&path).unwrap().restore();
    let restored_panel = restored.panel(first_id).unwrap();
    assert_eq!(restored_panel.center, Point::new(4.321, 1.234));
}

#[test]
fn load_updates_modified_timestamp() {
    let (store, catalog, _) = committed_project();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stamp.skp.json");

    let file = ProjectFile::from_store("Stamp", &store, &catalog);
    file.save_to_file(&path).unwrap();

    let loaded = ProjectFile::load_from_file(&path).unwrap();
    assert_eq!(loaded.metadata.id, file.metadata.id);
    assert_eq!(loaded.metadata.created, file.metadata.created);
    assert!(loaded.metadata.modified >= file.metadata.modified);
}

#[test]
fn missing_file_reports_context() {
    let err = ProjectFile::load_from_file("/definitely/not/here.skp.json").unwrap_err();
    assert!(err.to_string().contains("Failed to read project file"));
}
