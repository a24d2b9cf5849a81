//! Integration tests for grid layout generation and commit.

use proptest::prelude::*;

use solarkit_planner::{
    CoverageRatio, GridAnchor, GridConfig, LayoutEngine, ModuleCatalog, ModuleOrientation,
    ModuleSpec, PanelRect, PlacementStore, Point, Polygon, RoofProvenance, RoofSurface,
};

fn rect_poly(w: f64, h: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ])
}

fn scenario_roof(tilt: f64) -> RoofSurface {
    RoofSurface::new(1, rect_poly(10.0, 6.0), 0.0, tilt, RoofProvenance::Drawn)
}

fn scenario_module() -> ModuleSpec {
    ModuleSpec::new("m", "Scenario module", 1.7, 1.1, 400.0)
}

fn scenario_config() -> GridConfig {
    GridConfig {
        margin_m: 0.3,
        spacing_m: 0.02,
        orientation: ModuleOrientation::Portrait,
        coverage: CoverageRatio::Full,
        ..GridConfig::default()
    }
}

/// Scenario A: the flat 10 m × 6 m roof fills with exactly
/// `floor((10-0.6)/(1.1+0.02)) * floor((6-0.6)/(1.7+0.02))` modules.
#[test]
fn scenario_a_exact_module_count() {
    let panels = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &scenario_config(), &[]);
    let expected_u = ((10.0_f64 - 0.6) / (1.1 + 0.02)).floor() as usize;
    let expected_v = ((6.0_f64 - 0.6) / (1.7 + 0.02)).floor() as usize;
    assert_eq!(expected_u, 8);
    assert_eq!(expected_v, 3);
    assert_eq!(panels.len(), expected_u * expected_v);
}

/// Scenario B: an exclusion zone covering exactly one cell's center
/// removes exactly that one module.
#[test]
fn scenario_b_zone_drops_one_cell() {
    let roof = scenario_roof(0.0);
    let module = scenario_module();
    let config = scenario_config();
    let baseline = LayoutEngine::generate(&roof, &module, &config, &[]);

    // First cell's center: margin 0.3 plus half the footprint.
    let target = Point::new(0.3 + 1.1 / 2.0, 0.3 + 1.7 / 2.0);
    assert!(baseline
        .iter()
        .any(|p| p.center.distance_to(&target) < 1e-9));

    let mut store = PlacementStore::new();
    let roof_id = store.add_roof(rect_poly(10.0, 6.0), 0.0, 0.0, RoofProvenance::Drawn);
    let zone_id = store
        .add_zone(
            roof_id,
            Polygon::new(vec![
                Point::new(target.x - 0.05, target.y - 0.05),
                Point::new(target.x + 0.05, target.y - 0.05),
                Point::new(target.x + 0.05, target.y + 0.05),
                Point::new(target.x - 0.05, target.y + 0.05),
            ]),
        )
        .unwrap();
    let zones: Vec<_> = store.zones().cloned().collect();
    assert_eq!(zones[0].id, zone_id);

    let filtered = LayoutEngine::generate(&roof, &module, &config, &zones);
    assert_eq!(filtered.len(), baseline.len() - 1);
    assert!(!filtered
        .iter()
        .any(|p| p.center.distance_to(&target) < 1e-9));
}

#[test]
fn generation_is_deterministic() {
    let roof = scenario_roof(30.0);
    let module = scenario_module();
    let config = scenario_config();
    let first = LayoutEngine::generate(&roof, &module, &config, &[]);
    let second = LayoutEngine::generate(&roof, &module, &config, &[]);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn no_corner_escapes_the_eroded_region() {
    let panels = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &scenario_config(), &[]);
    for panel in &panels {
        for corner in panel.corners().vertices() {
            assert!(corner.x >= 0.3 - 1e-9 && corner.x <= 9.7 + 1e-9);
            assert!(corner.y >= 0.3 - 1e-9 && corner.y <= 5.7 + 1e-9);
        }
    }
}

#[test]
fn no_two_modules_overlap() {
    let panels = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &scenario_config(), &[]);
    for (i, a) in panels.iter().enumerate() {
        for b in panels.iter().skip(i + 1) {
            let dx = (a.center.x - b.center.x).abs();
            let dy = (a.center.y - b.center.y).abs();
            assert!(
                dx >= 1.1 + 0.02 - 1e-9 || dy >= 1.7 + 0.02 - 1e-9,
                "panels at {:?} and {:?} overlap",
                a.center,
                b.center
            );
        }
    }
}

#[test]
fn tilt_packs_more_rows_up_the_slope() {
    let flat = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &scenario_config(), &[]);
    let steep = LayoutEngine::generate(&scenario_roof(60.0), &scenario_module(), &scenario_config(), &[]);
    assert!(steep.len() > flat.len());
    // The fall-axis footprint shrinks to the plan projection.
    for panel in &steep {
        assert!((panel.height_m - 1.7 * 60.0_f64.to_radians().cos()).abs() < 1e-9);
        assert!((panel.width_m - 1.1).abs() < 1e-12);
    }
}

#[test]
fn landscape_orientation_swaps_the_grid() {
    let config = GridConfig {
        orientation: ModuleOrientation::Landscape,
        ..scenario_config()
    };
    let panels = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &config, &[]);
    // floor((9.4-1.7)/1.72)+1 = 5 across, floor((5.4-1.1)/1.12)+1 = 4 rows.
    assert_eq!(panels.len(), 20);
    assert!((panels[0].width_m - 1.7).abs() < 1e-12);
    assert!((panels[0].height_m - 1.1).abs() < 1e-12);
}

#[test]
fn end_anchor_shifts_the_grid_without_losing_cells() {
    let start = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &scenario_config(), &[]);
    let config = GridConfig {
        anchor_u: GridAnchor::End,
        ..scenario_config()
    };
    let end = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &config, &[]);
    assert_eq!(start.len(), end.len());

    let min_x = |panels: &[PanelRect]| {
        panels
            .iter()
            .map(|p| p.center.x)
            .fold(f64::INFINITY, f64::min)
    };
    // Start packs against the left margin, End against the right.
    assert!(min_x(&end) > min_x(&start) + 0.1);
}

#[test]
fn phase_shift_drops_the_trailing_column() {
    let config = GridConfig {
        phase_u: 0.5,
        ..scenario_config()
    };
    let panels = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &config, &[]);
    // Half a cell of shift costs one of the eight columns.
    assert_eq!(panels.len(), 7 * 3);
}

#[test]
fn commit_places_catalog_modules_into_the_store() {
    let mut store = PlacementStore::new();
    let catalog = ModuleCatalog::with_defaults();
    let roof = store.add_roof(rect_poly(10.0, 6.0), 0.0, 0.0, RoofProvenance::Imported);
    store
        .set_roof_config(
            roof,
            GridConfig {
                module_id: Some("mono-410".into()),
                ..scenario_config()
            },
        )
        .unwrap();

    let ids = LayoutEngine::commit(&mut store, &catalog, roof).unwrap();
    assert!(!ids.is_empty());
    assert_eq!(store.panel_count(roof), ids.len());

    // Dimensions come from the catalog entry.
    let spec = catalog.get("mono-410").unwrap();
    let panel = store.panels_on_roof(roof).next().unwrap();
    assert!((panel.width_m - spec.short_side_m).abs() < 1e-12);
    assert!((panel.height_m - spec.long_side_m).abs() < 1e-12);

    let summary = store.roof_summary(roof, &catalog);
    assert_eq!(summary.panel_count, ids.len());
    assert!((summary.installed_watts - ids.len() as f64 * spec.rated_watts).abs() < 1e-6);

    // Re-committing replaces rather than accumulates.
    let again = LayoutEngine::commit(&mut store, &catalog, roof).unwrap();
    assert_eq!(again.len(), ids.len());
    assert_eq!(store.panel_count(roof), ids.len());
}

#[test]
fn commit_without_module_selection_is_a_noop() {
    let mut store = PlacementStore::new();
    let catalog = ModuleCatalog::with_defaults();
    let roof = store.add_roof(rect_poly(10.0, 6.0), 0.0, 0.0, RoofProvenance::Drawn);
    store
        .add_panel(
            roof,
            PanelRect::new(Point::new(2.0, 2.0), 1.1, 1.7, 0.0),
            "mono-410",
        )
        .unwrap();

    let ids = LayoutEngine::commit(&mut store, &catalog, roof).unwrap();
    assert!(ids.is_empty());
    // The existing placement is untouched.
    assert_eq!(store.panel_count(roof), 1);
}

#[test]
fn rotated_roof_keeps_panels_inside_its_outline() {
    // A 45°-rotated rectangle; the grid should follow the longest edge.
    let boundary = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(7.07, 7.07),
        Point::new(2.83, 11.31),
        Point::new(-4.24, 4.24),
    ]);
    let roof = RoofSurface::new(1, boundary.clone(), 45.0, 0.0, RoofProvenance::Drawn);
    let panels = LayoutEngine::generate(&roof, &scenario_module(), &scenario_config(), &[]);
    assert!(!panels.is_empty());
    for panel in &panels {
        assert!((panel.angle_deg - 45.0).abs() < 1e-9);
        for corner in panel.corners().vertices() {
            assert!(
                solarkit_core::exclusion::point_in_polygon(*corner, &boundary),
                "corner {corner:?} left the roof outline"
            );
        }
    }
}

proptest! {
    /// Margins and spacings never produce an error or a module outside
    /// the margin-eroded box of the rectangular scenario roof.
    #[test]
    fn generated_cells_respect_arbitrary_margins(
        margin in 0.0..3.5f64,
        spacing in 0.0..0.5f64,
    ) {
        let config = GridConfig {
            margin_m: margin,
            spacing_m: spacing,
            ..scenario_config()
        };
        let panels = LayoutEngine::generate(&scenario_roof(0.0), &scenario_module(), &config, &[]);
        for panel in &panels {
            for corner in panel.corners().vertices() {
                prop_assert!(corner.x >= margin - 1e-6 && corner.x <= 10.0 - margin + 1e-6);
                prop_assert!(corner.y >= margin - 1e-6 && corner.y <= 6.0 - margin + 1e-6);
            }
        }
    }
}
