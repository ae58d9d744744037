// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge lines running from the screen corners back to the background plane.

use kurbo::Rect;

use crate::gpu::{Line3d, LineStyle, LineVertex};

/// Width and smoothing of the wireframe lines.
pub const WIREFRAME_STYLE: LineStyle = LineStyle {
    width: 2.0,
    smooth: true,
};

/// Alpha at the screen plane and at the background plane.
#[must_use]
pub fn wireframe_alphas(edges_strength: f64, lighting_strength: f64) -> (f64, f64) {
    let far = 0.5 * edges_strength;
    let near = far * 0.8 * (1.0 - lighting_strength) * edges_strength;
    (near, far)
}

/// Four white lines, one per corner of `output`, from `z = 0` to
/// `z = -depth`, in output pixels.
#[must_use]
pub fn background_wireframe(
    output: Rect,
    depth: f64,
    edges_strength: f64,
    lighting_strength: f64,
) -> [Line3d; 4] {
    let (near, far) = wireframe_alphas(edges_strength, lighting_strength);
    let edge = |x: f64, y: f64| Line3d {
        start: LineVertex {
            position: [x, y, 0.0],
            color: [1.0, 1.0, 1.0, near],
        },
        end: LineVertex {
            position: [x, y, -depth],
            color: [1.0, 1.0, 1.0, far],
        },
    };
    [
        edge(output.x0, output.y0),
        edge(output.x0, output.y1),
        edge(output.x1, output.y0),
        edge(output.x1, output.y1),
    ]
}
