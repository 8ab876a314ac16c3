mod common;

use common::WritingBuilder;
use rstest::rstest;
use strokematch::writing::BoundingBox;
use strokematch::{Point, Stroke, StrokeMatchError, Writing};

#[test]
fn test_move_to_line_to_builds_strokes() {
    let mut w = Writing::new();
    w.move_to(0, 0);
    w.line_to(10, 10).unwrap();
    w.line_to(20, 10).unwrap();
    w.move_to(5, 5);
    w.line_to(5, 50).unwrap();

    assert_eq!(w.n_strokes(), 2);
    assert_eq!(w.n_points(), 5);
    assert_eq!(w.stroke(1).unwrap().coordinates(), vec![(5, 5), (5, 50)]);
}

#[test]
fn test_line_to_without_stroke_fails() {
    let mut w = Writing::new();
    assert!(matches!(w.line_to(1, 1), Err(StrokeMatchError::MalformedInput(_))));
}

#[test]
fn test_stroke_editing() {
    let mut w = WritingBuilder::new()
        .stroke(&[(0, 0), (1, 1)])
        .stroke(&[(2, 2), (3, 3)])
        .build();

    w.insert_stroke(0, Stroke::from_coordinates(&[(9, 9)])).unwrap();
    assert_eq!(w.stroke(0).unwrap().coordinates(), vec![(9, 9)]);

    let old = w
        .replace_stroke(2, Stroke::from_coordinates(&[(7, 7)]))
        .unwrap()
        .unwrap();
    assert_eq!(old.coordinates(), vec![(2, 2), (3, 3)]);

    assert!(w.remove_stroke(10).is_none());
    assert_eq!(w.n_strokes(), 3);
    assert!(w.remove_stroke(0).is_some());
    assert!(w.remove_last_stroke().is_some());
    assert_eq!(w.n_strokes(), 1);

    w.clear();
    assert!(w.is_empty());
    assert!(w.bounding_box().is_none());
}

#[test]
fn test_bounding_box_and_size() {
    let w = WritingBuilder::new()
        .stroke(&[(100, 200), (300, 250)])
        .stroke(&[(150, 50)])
        .build();
    assert_eq!(
        w.bounding_box(),
        Some(BoundingBox {
            x: 100,
            y: 50,
            width: 200,
            height: 200
        })
    );
    assert_eq!(w.size(), Some((100, 50, 200, 200)));
}

#[test]
fn test_normalize_scales_and_centers() {
    let mut w = WritingBuilder::new().stroke(&[(100, 100), (300, 500)]).build();
    w.normalize();
    assert_eq!(w.stroke(0).unwrap().coordinates(), vec![(150, 150), (850, 850)]);

    let once = w.clone();
    w.normalize();
    assert_eq!(w, once);
}

#[test]
fn test_normalize_does_not_stretch_thin_axis() {
    // width is exactly 10% of the canvas, so x keeps its scale
    let mut w = WritingBuilder::new().stroke(&[(0, 0), (100, 200)]).build();
    w.normalize();
    assert_eq!(w.stroke(0).unwrap().coordinates(), vec![(450, 150), (550, 850)]);
}

#[test]
fn test_normalize_single_point_and_empty() {
    let mut w = WritingBuilder::new().stroke(&[(10, 990)]).build();
    w.normalize();
    assert_eq!(w.stroke(0).unwrap().coordinates(), vec![(500, 500)]);

    let mut empty = Writing::new();
    empty.normalize();
    assert!(empty.is_empty());
}

#[test]
fn test_normalize_respects_canvas() {
    let mut w = WritingBuilder::new()
        .canvas(200, 100)
        .stroke(&[(0, 0), (100, 100)])
        .build();
    w.normalize();
    // x: 140 wide, y: 70 tall, centered on 200x100
    assert_eq!(w.stroke(0).unwrap().coordinates(), vec![(30, 15), (170, 85)]);
}

#[rstest]
#[case(&[(0, 0), (400, 400)], true)]
#[case(&[(600, 0), (1000, 300)], true)]
#[case(&[(600, 600), (900, 900)], true)]
#[case(&[(100, 100), (900, 900)], false)]
#[case(&[(100, 300), (300, 700)], false)]
fn test_is_small(#[case] coords: &[(i32, i32)], #[case] expected: bool) {
    let w = WritingBuilder::new().stroke(coords).build();
    assert_eq!(w.is_small(), expected, "is_small failed for {:?}", coords);
}

#[test]
fn test_duration_spans_strokes() {
    let mut w = Writing::new();
    w.move_to_point(Point::new(0, 0).with_timestamp(100));
    w.line_to_point(Point::new(5, 5).with_timestamp(150)).unwrap();
    w.move_to_point(Point::new(9, 9).with_timestamp(400));
    assert_eq!(w.duration(), Some(300));
}

#[test]
fn test_json_round_trip_keeps_absent_fields() {
    let mut w = Writing::new();
    w.move_to_point(Point::new(1, 2).with_pressure(0.5).with_timestamp(7));
    w.line_to_point(Point::new(3, 4)).unwrap();

    let json = w.to_json().unwrap();
    let back = Writing::from_json(&json).unwrap();
    assert_eq!(back, w);
    assert_eq!(back.stroke(0).unwrap().points()[1].pressure, None);
    assert_eq!(back.stroke(0).unwrap().points()[1].timestamp, None);
}

#[test]
fn test_empty_strokes_are_rejected() {
    let mut w = WritingBuilder::new().stroke(&[(0, 0), (1, 1)]).build();

    for res in [
        w.append_stroke(Stroke::new()),
        w.insert_stroke(0, Stroke::new()),
        w.replace_stroke(0, Stroke::new()).map(|_| ()),
    ] {
        assert!(matches!(res, Err(StrokeMatchError::MalformedInput(_))));
    }
    assert_eq!(w.n_strokes(), 1);
    assert_eq!(w.stroke(0).unwrap().len(), 2);

    let json = r#"{"strokes":[{"points":[{"x":1,"y":2}]},{"points":[]}]}"#;
    assert!(matches!(Writing::from_json(json), Err(StrokeMatchError::Json(_))));
    let none: &[(i32, i32)] = &[];
    assert_eq!(Writing::from_strokes(&[none, &[(3, 4)]]).n_strokes(), 1);
}

#[test]
fn test_json_defaults_canvas() {
    let w = Writing::from_json(r#"{"strokes":[{"points":[{"x":1,"y":2}]}]}"#).unwrap();
    assert_eq!((w.width(), w.height()), (1000, 1000));
    assert_eq!(w.n_points(), 1);
}

#[test]
fn test_resampling_applies_to_every_stroke() {
    let mut w = WritingBuilder::new()
        .stroke(&[(0, 0), (100, 0)])
        .stroke(&[(0, 50), (0, 150)])
        .build();
    w.upsample_threshold(25.0).unwrap();
    assert_eq!(w.n_points(), 10);

    w.downsample_threshold(60.0);
    assert_eq!(w.stroke(0).unwrap().coordinates(), vec![(0, 0), (75, 0), (100, 0)]);

    assert!(w.upsample_threshold(0.0).is_err());
    assert!(w.downsample(0).is_err());
}
