//! Perspective transformation and image warping.
//!
//! This module computes the projective mapping between a quadrilateral and
//! an axis-aligned rectangle and resamples a grayscale image through it,
//! which is how a skewed puzzle photograph becomes an axis-aligned board.

use crate::core::errors::{SudocrError, SudocrResult};
use crate::processors::geometry::Point;
use image::GrayImage;
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use tracing::debug;

/// Calculates the perspective transformation matrix that maps source points
/// to destination points.
///
/// Solves the eight-equation linear system of the direct linear transform
/// for the four point correspondences.
///
/// # Arguments
///
/// * `src_points` - The four source points.
/// * `dst_points` - The four destination points.
///
/// # Returns
///
/// The 3x3 transformation matrix.
///
/// # Errors
///
/// Returns [`SudocrError::DegenerateGeometry`] if the system is singular,
/// which happens when the source points are collinear or coincident.
pub fn get_perspective_transform(
    src_points: &[Point; 4],
    dst_points: &[Point; 4],
) -> SudocrResult<Matrix3<f32>> {
    let mut a = nalgebra::DMatrix::<f32>::zeros(8, 8);
    let mut b = nalgebra::DVector::<f32>::zeros(8);

    for i in 0..4 {
        let src = &src_points[i];
        let dst = &dst_points[i];

        a.set_row(
            i * 2,
            &nalgebra::RowDVector::from_row_slice(&[
                src.x,
                src.y,
                1.0,
                0.0,
                0.0,
                0.0,
                -src.x * dst.x,
                -src.y * dst.x,
            ]),
        );
        b[i * 2] = dst.x;

        a.set_row(
            i * 2 + 1,
            &nalgebra::RowDVector::from_row_slice(&[
                0.0,
                0.0,
                0.0,
                src.x,
                src.y,
                1.0,
                -src.x * dst.y,
                -src.y * dst.y,
            ]),
        );
        b[i * 2 + 1] = dst.y;
    }

    let decomp = a.lu();
    let solution = decomp
        .solve(&b)
        .ok_or_else(|| SudocrError::degenerate("perspective system is singular"))?;

    Ok(Matrix3::new(
        solution[0],
        solution[1],
        solution[2],
        solution[3],
        solution[4],
        solution[5],
        solution[6],
        solution[7],
        1.0,
    ))
}

/// Applies a perspective transformation to a grayscale image.
///
/// Uses inverse mapping with bilinear interpolation; destination rows are
/// processed in parallel. Destination pixels whose source location falls
/// outside the image are black.
///
/// # Arguments
///
/// * `src_image` - The source image to transform.
/// * `transform_matrix` - The 3x3 perspective transformation matrix.
/// * `dst_width` - Width of the output image.
/// * `dst_height` - Height of the output image.
///
/// # Returns
///
/// The transformed image.
///
/// # Errors
///
/// Returns [`SudocrError::DegenerateGeometry`] if the transformation matrix
/// cannot be inverted.
pub fn warp_perspective(
    src_image: &GrayImage,
    transform_matrix: &Matrix3<f32>,
    dst_width: u32,
    dst_height: u32,
) -> SudocrResult<GrayImage> {
    let inv_matrix = transform_matrix
        .try_inverse()
        .ok_or_else(|| SudocrError::degenerate("transformation matrix is not invertible"))?;

    debug!(dst_width, dst_height, "warping through inverse mapping");

    let mut dst_image = GrayImage::new(dst_width, dst_height);
    let (src_width, src_height) = src_image.dimensions();
    let max_x = (src_width - 1) as f32;
    let max_y = (src_height - 1) as f32;
    let buffer: &mut [u8] = dst_image.as_mut();

    // Sub-pixel drift from the matrix solve must not drop border pixels.
    const EDGE_TOLERANCE: f32 = 1e-3;

    buffer
        .par_chunks_mut(dst_width as usize)
        .enumerate()
        .for_each(|(dst_y, row_buffer)| {
            for (dst_x, out) in row_buffer.iter_mut().enumerate() {
                let dst_point = Vector3::new(dst_x as f32, dst_y as f32, 1.0);
                let src_point = inv_matrix * dst_point;

                let mut value = 0u8;
                if src_point.z.abs() > f32::EPSILON {
                    let src_x = src_point.x / src_point.z;
                    let src_y = src_point.y / src_point.z;

                    if src_x >= -EDGE_TOLERANCE
                        && src_x <= max_x + EDGE_TOLERANCE
                        && src_y >= -EDGE_TOLERANCE
                        && src_y <= max_y + EDGE_TOLERANCE
                    {
                        value = sample_bilinear(
                            src_image,
                            src_x.clamp(0.0, max_x),
                            src_y.clamp(0.0, max_y),
                        );
                    }
                }
                *out = value;
            }
        });

    Ok(dst_image)
}

/// Samples the image at a fractional location with bilinear interpolation.
fn sample_bilinear(image: &GrayImage, x: f32, y: f32) -> u8 {
    let (width, height) = image.dimensions();

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = image.get_pixel(x0, y0)[0] as f32;
    let p10 = image.get_pixel(x1, y0)[0] as f32;
    let p01 = image.get_pixel(x0, y1)[0] as f32;
    let p11 = image.get_pixel(x1, y1)[0] as f32;

    let top = p00 * (1.0 - fx) + p10 * fx;
    let bottom = p01 * (1.0 - fx) + p11 * fx;
    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
}
