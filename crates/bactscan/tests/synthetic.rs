use bactscan::combine::combine_maps;
use bactscan::reference::disk_offsets;
use bactscan::{
    detect_bacteria, Bounds, DetectError, DetectionResult, DetectorParams, ScanFrame,
    SizeConstraints,
};
use bactscan_core::HeightMap;

const ROWS: usize = 128;
const COLS: usize = 128;
const RATIO: f64 = 0.1;
const PLATEAU: f64 = 0.5e-6;

/// Flat-topped ellipse: `(col, row)` center and `(a, b)` semi-axes along
/// columns and rows, in pixels.
#[derive(Clone, Copy)]
struct Rod {
    center: (f64, f64),
    axes: (f64, f64),
}

fn render(rods: &[Rod]) -> HeightMap {
    HeightMap::from_fn(ROWS, COLS, |r, c| {
        let inside = rods.iter().any(|rod| {
            let dx = (c as f64 - rod.center.0) / rod.axes.0;
            let dy = (r as f64 - rod.center.1) / rod.axes.1;
            dx * dx + dy * dy <= 1.0
        });
        if inside {
            PLATEAU
        } else {
            0.0
        }
    })
}

fn horizontal_rod() -> Rod {
    Rod {
        center: (64.0, 60.0),
        axes: (15.0, 4.0),
    }
}

fn params() -> DetectorParams {
    DetectorParams::new(RATIO, 0.65e-6, SizeConstraints::default())
}

fn detect(map: &HeightMap, params: &DetectorParams) -> DetectionResult {
    detect_bacteria(map, map, params).expect("detection")
}

#[test]
fn recovers_a_single_elliptical_bump() {
    let map = render(&[horizontal_rod()]);
    let res = detect(&map, &params());

    assert!(res.found);
    assert_eq!(res.objects.len(), 1);
    let obj = &res.objects[0];
    assert_eq!(obj.name, "Bacteria1");

    let c = obj.points.center;
    assert!((c.x - 64).abs() <= 2 && (c.y - 60).abs() <= 2, "center {c:?}");

    // 31 x 9 px of plateau, edges may add a pixel on each side
    assert!((2.8..=3.5).contains(&obj.length), "length {}", obj.length);
    assert!((0.7..=1.2).contains(&obj.width), "width {}", obj.width);
    assert!((0.45e-6..=0.55e-6).contains(&obj.peak_height));

    // major axis along x
    let (top, bottom) = (obj.points.top, obj.points.bottom);
    assert!((top.y - c.y).abs() <= 1 && (bottom.y - c.y).abs() <= 1);
    assert!((top.x - c.x).abs() >= 6 && (bottom.x - c.x).abs() >= 6);
    assert!((top.x - c.x).signum() != (bottom.x - c.x).signum());

    assert!((obj.pxy - 2.0 * obj.dxy / RATIO).abs() < 1e-9);
    assert!(obj.points.reference.is_some());
    assert_eq!(res.previews.measurements.len(), 1);
    assert_eq!(res.previews.measurements[0].name, "Bacteria1");
}

#[test]
fn vertical_rod_points_along_rows() {
    let rod = Rod {
        center: (60.0, 64.0),
        axes: (4.0, 15.0),
    };
    let res = detect(&render(&[rod]), &params());
    assert_eq!(res.objects.len(), 1);
    let obj = &res.objects[0];
    let (c, top) = (obj.points.center, obj.points.top);
    assert!((top.x - c.x).abs() <= 1);
    assert!((top.y - c.y).abs() >= 6);
}

#[test]
fn reference_disk_lies_in_the_background() {
    let map = render(&[horizontal_rod()]);
    let p = params();
    let res = detect(&map, &p);
    let reference = res.objects[0].points.reference.expect("reference point");

    let combined = combine_maps(&map, &map, p.height_ceiling).unwrap();
    let threshold = p.constraints.climit * combined.top;
    assert_eq!(combined.top, res.top);

    for (dx, dy) in disk_offsets(p.corona_px()) {
        let (x, y) = (reference.x + dx, reference.y + dy);
        if (0..COLS as i32).contains(&x) && (0..ROWS as i32).contains(&y) {
            let v = combined.map.get(y as usize, x as usize);
            assert!(v < threshold, "({x}, {y}) = {v:e} not background");
        }
    }

    // reference sits inside the ROI shrunk by the corona
    let roi = res.objects[0].roi;
    let k = p.corona_px();
    assert!(reference.x >= roi.x + k && reference.x < roi.x + roi.width - k);
    assert!(reference.y >= roi.y + k && reference.y < roi.y + roi.height - k);
}

#[test]
fn corona_wider_than_the_roi_leaves_no_reference() {
    let map = render(&[horizontal_rod()]);
    for corona in [1000.0, 1e12] {
        let mut p = params();
        p.constraints.corona = corona;
        let res = detect(&map, &p);
        assert_eq!(res.objects.len(), 1, "corona {corona}");
        assert!(res.objects[0].points.reference.is_none());
    }
}

#[test]
fn flat_input_has_no_false_positives() {
    let res = detect(&HeightMap::zeros(ROWS, COLS), &params());
    assert!(!res.found);
    assert!(res.objects.is_empty());

    let tilted = HeightMap::from_fn(ROWS, COLS, |r, c| 1e-9 * r as f64 + 2e-9 * c as f64);
    assert!(!detect(&tilted, &params()).found);
}

#[test]
fn features_missing_from_the_auxiliary_channel_are_ignored() {
    let map = render(&[horizontal_rod()]);
    let aux = HeightMap::zeros(ROWS, COLS);
    let res = detect_bacteria(&map, &aux, &params()).unwrap();
    assert!(!res.found);
}

#[test]
fn shape_mismatch_is_an_error() {
    let a = HeightMap::zeros(ROWS, COLS);
    let b = HeightMap::zeros(ROWS, COLS - 1);
    assert!(matches!(
        detect_bacteria(&a, &b, &params()),
        Err(DetectError::ShapeMismatch { .. })
    ));
}

#[test]
fn size_bounds_reject_out_of_range_rods() {
    let map = render(&[horizontal_rod()]);
    let mut p = params();
    p.constraints.length = Bounds::new(4.0, 5.0);
    assert!(!detect(&map, &p).found);

    let mut p = params();
    p.constraints.height = Bounds::new(0.6, 0.65);
    assert!(!detect(&map, &p).found);
}

#[test]
fn objects_are_named_in_discovery_order() {
    let upper = Rod {
        center: (40.0, 30.0),
        axes: (15.0, 4.0),
    };
    let lower = Rod {
        center: (85.0, 95.0),
        axes: (15.0, 4.0),
    };
    let res = detect(&render(&[lower, upper]), &params());
    assert_eq!(res.objects.len(), 2);
    assert_eq!(res.objects[0].name, "Bacteria1");
    assert_eq!(res.objects[1].name, "Bacteria2");
    assert!(res.objects[0].points.center.y < res.objects[1].points.center.y);
    assert_eq!(res.get("Bacteria2").map(|o| o.name.as_str()), Some("Bacteria2"));
}

#[test]
fn physical_sizes_scale_with_ratio() {
    let map = render(&[horizontal_rod()]);
    let base = detect(&map, &params());

    let mut doubled = params();
    doubled.ratio = 2.0 * RATIO;
    let c = &mut doubled.constraints;
    c.length = c.length.scaled(2.0);
    c.width = c.width.scaled(2.0);
    c.corona *= 2.0;
    let scaled = detect(&map, &doubled);

    assert_eq!(base.objects.len(), 1);
    assert_eq!(scaled.objects.len(), 1);
    let (a, b) = (&base.objects[0], &scaled.objects[0]);
    assert!((b.length - 2.0 * a.length).abs() < 1e-9);
    assert!((b.width - 2.0 * a.width).abs() < 1e-9);
    assert_eq!(a.points, b.points);
}

#[test]
fn stage_coordinates_follow_the_frame() {
    let map = render(&[horizontal_rod()]);
    let res = detect(&map, &params());
    let frame = ScanFrame {
        x0: 50.0,
        y0: 50.0,
        dx: COLS as f64 * RATIO,
        dy: ROWS as f64 * RATIO,
        ratio: RATIO,
    };
    let stage = res.to_stage(&frame);
    assert_eq!(stage.len(), 1);
    let c = res.objects[0].points.center;
    let expected_x = c.x as f64 * RATIO - frame.dx / 2.0 + 50.0;
    assert!((stage[0].points.center.x - expected_x).abs() < 1e-9);
}
