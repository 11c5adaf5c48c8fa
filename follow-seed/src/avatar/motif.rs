use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Decorative overlay family, chosen by `index % 3`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motif {
    Circles,
    Squares,
    Triangles,
}

/// One shape of a motif, in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Circle inscribed in a `diameter` box whose top-left is (x, y)
    Circle { x: i32, y: i32, diameter: i32 },
    /// Inclusive square box from (x, y) to (x + side, y + side)
    Square { x: i32, y: i32, side: i32 },
    /// Apex at (x, y), base corners at (x ± half_base, y + height)
    Triangle { x: i32, y: i32, half_base: i32, height: i32 },
}

impl Motif {
    pub fn for_index(index: u32) -> Self {
        match index % 3 {
            0 => Motif::Circles,
            1 => Motif::Squares,
            _ => Motif::Triangles,
        }
    }

    /// Shapes for `index`; positions depend only on the index and loop counter
    pub fn shapes(&self, index: u32) -> Vec<Shape> {
        // Only `index % 3` and `index % 2` matter; reducing mod 6 keeps the
        // arithmetic in range for any u32
        let index = (index % 6) as i32;
        match self {
            Motif::Circles => (0..3)
                .map(|k| Shape::Circle {
                    x: 40 + k * 40,
                    y: 40 + ((index + k) % 3) * 40,
                    diameter: 30,
                })
                .collect(),
            Motif::Squares => (0..2)
                .map(|k| Shape::Square {
                    x: 50 + k * 60,
                    y: 50 + ((index + k) % 2) * 60,
                    side: 40,
                })
                .collect(),
            Motif::Triangles => (0..2)
                .map(|k| Shape::Triangle {
                    x: 60 + k * 50,
                    y: 70 + ((index + k) % 2) * 30,
                    half_base: 20,
                    height: 40,
                })
                .collect(),
        }
    }
}

impl Shape {
    /// Rasterise into a coverage mask (255 = covered)
    pub fn fill(&self, mask: &mut GrayImage) {
        let on = Luma([255u8]);
        match *self {
            Shape::Circle { x, y, diameter } => {
                let radius = diameter / 2;
                draw_filled_circle_mut(mask, (x + radius, y + radius), radius, on);
            }
            Shape::Square { x, y, side } => {
                let size = (side + 1) as u32;
                draw_filled_rect_mut(mask, Rect::at(x, y).of_size(size, size), on);
            }
            Shape::Triangle { x, y, half_base, height } => {
                let points = [
                    Point::new(x, y),
                    Point::new(x + half_base, y + height),
                    Point::new(x - half_base, y + height),
                ];
                draw_polygon_mut(mask, &points, on);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_motif_cycle() {
        assert_eq!(Motif::for_index(1), Motif::Squares);
        assert_eq!(Motif::for_index(2), Motif::Triangles);
        assert_eq!(Motif::for_index(3), Motif::Circles);
        assert_eq!(Motif::for_index(4), Motif::Squares);
    }

    #[test]
    fn test_circle_positions() {
        let shapes = Motif::Circles.shapes(3);
        assert_eq!(
            shapes,
            vec![
                Shape::Circle { x: 40, y: 40, diameter: 30 },
                Shape::Circle { x: 80, y: 80, diameter: 30 },
                Shape::Circle { x: 120, y: 120, diameter: 30 },
            ]
        );
    }

    #[test]
    fn test_square_and_triangle_positions() {
        assert_eq!(
            Motif::Squares.shapes(1),
            vec![
                Shape::Square { x: 50, y: 110, side: 40 },
                Shape::Square { x: 110, y: 50, side: 40 },
            ]
        );
        assert_eq!(
            Motif::Triangles.shapes(2),
            vec![
                Shape::Triangle { x: 60, y: 70, half_base: 20, height: 40 },
                Shape::Triangle { x: 110, y: 100, half_base: 20, height: 40 },
            ]
        );
    }

    #[test]
    fn test_fill_covers_square_inclusively() {
        let mut mask = GrayImage::new(200, 200);
        Shape::Square { x: 50, y: 50, side: 40 }.fill(&mut mask);

        assert_eq!(mask.get_pixel(50, 50)[0], 255);
        assert_eq!(mask.get_pixel(90, 90)[0], 255);
        assert_eq!(mask.get_pixel(91, 91)[0], 0);
        assert_eq!(mask.get_pixel(49, 50)[0], 0);
    }

    #[test]
    fn test_fill_circle_centre() {
        let mut mask = GrayImage::new(200, 200);
        Shape::Circle { x: 40, y: 40, diameter: 30 }.fill(&mut mask);

        assert_eq!(mask.get_pixel(55, 55)[0], 255);
        assert_eq!(mask.get_pixel(40, 40)[0], 0);
    }

    proptest! {
        #[test]
        fn prop_motif_has_period_three(index in 1u32..10_000) {
            prop_assert_eq!(Motif::for_index(index), Motif::for_index(index + 3));
        }

        #[test]
        fn prop_shapes_stay_on_canvas(index in 1u32..=1000) {
            for shape in Motif::for_index(index).shapes(index) {
                let (left, top, right, bottom) = match shape {
                    Shape::Circle { x, y, diameter } => (x, y, x + diameter, y + diameter),
                    Shape::Square { x, y, side } => (x, y, x + side, y + side),
                    Shape::Triangle { x, y, half_base, height } => (x - half_base, y, x + half_base, y + height),
                };
                prop_assert!(left >= 0 && top >= 0 && right < 200 && bottom < 200);
            }
        }
    }
}
