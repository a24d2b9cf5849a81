use solarkit_planner::{GridConfig, LayoutEngine, ModuleCatalog, PlacementStore, Point, Polygon, ProjectFile, RoofProvenance};
fn rect_poly(w: f64, h: f64) -> Polygon {
    Polygon::new(vec![Point::new(0.0,0.0),Point::new(w,0.0),Point::new(w,h),Point::new(0.0,h)])
}
fn main() {
    let mut store = PlacementStore::new();
    let catalog = ModuleCatalog::with_defaults();
    let roof = store.add_roof(rect_poly(10.0,6.0),0.0,35.0,RoofProvenance::Imported);
    store.set_roof_config(roof, GridConfig{module_id:Some("mono-410".into()), ..GridConfig::default()}).unwrap();
    store.add_zone(roof, Polygon::new(vec![Point::new(4.0,2.0),Point::new(5.0,2.0),Point::new(5.0,3.0),Point::new(4.0,3.0)])).unwrap();
    LayoutEngine::commit(&mut store, &catalog, roof).unwrap();
    let p = store.panels().find(|p| p.id==9).unwrap();
    println!("before: x={:?} y={:?}", p.center.x, p.center.y);
    let file = ProjectFile::from_store("x", &store, &catalog);
    let json = serde_json::to_string(&file).unwrap();
    // find the panel id 9 snippet
    let idx = json.find("7.791").or(json.find("7.790")).unwrap_or(0);
    println!("json snippet: {}", &json[idx.saturating_sub(0)..(idx+40).min(json.len())]);
    std::fs::write("/tmp/proj.json", &json).unwrap();
    let loaded = ProjectFile::load_from_file("/tmp/proj.json").unwrap();
    let (rs,_) = loaded.restore();
    let p2 = rs.panels().find(|p| p.id==9).unwrap();
    println!("after:  x={:?} y={:?}", p2.center.x, p2.center.y);
}
