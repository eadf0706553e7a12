//! Reuse of earlier results for identical or compatible constraints.

use super::LayoutRequest;
use crate::layout::CachedMeasurement;
use crate::node::Node;
use sprig_values::numeric::round_value_to_pixel_grid;
use sprig_values::{FlexDirection, MeasureMode, floats_equal, is_undefined};

/// Where a cache hit came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CacheSlot {
    Layout,
    Measurement(usize),
}

/// Look up a result usable for `request`.
///
/// Measured leaves accept compatible constraints; containers only reuse an
/// entry recorded under exactly the same constraints.
pub(super) fn find_cached(node: &Node, request: &LayoutRequest) -> Option<(CachedMeasurement, CacheSlot)> {
    let layout = &node.layout;
    let measurements = layout
        .cached_measurements
        .get(..layout.next_cached_measurements_index)
        .unwrap_or(&[]);

    if node.has_measure_func() {
        let scale = node.config.point_scale_factor();
        let margin_row = node.margin_for_axis(FlexDirection::Row, request.owner_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, request.owner_width);
        let fits = |entry: &CachedMeasurement| {
            can_use_cached_measurement(request, entry, margin_row, margin_column, scale)
        };
        if let Some(entry) = layout.cached_layout
            && fits(&entry)
        {
            return Some((entry, CacheSlot::Layout));
        }
        return measurements
            .iter()
            .enumerate()
            .find(|(_, entry)| fits(entry))
            .map(|(index, entry)| (*entry, CacheSlot::Measurement(index)));
    }

    let same_constraints = |entry: &CachedMeasurement| {
        floats_equal(entry.available_width, request.available_width)
            && floats_equal(entry.available_height, request.available_height)
            && entry.width_measure_mode == request.width_mode
            && entry.height_measure_mode == request.height_mode
    };
    if request.perform_layout {
        layout
            .cached_layout
            .filter(|entry| same_constraints(entry))
            .map(|entry| (entry, CacheSlot::Layout))
    } else {
        measurements
            .iter()
            .enumerate()
            .find(|(_, entry)| same_constraints(entry))
            .map(|(index, entry)| (*entry, CacheSlot::Measurement(index)))
    }
}

/// True when a size measured under `last` is also valid under `request`.
pub(super) fn can_use_cached_measurement(
    request: &LayoutRequest,
    last: &CachedMeasurement,
    margin_row: f32,
    margin_column: f32,
    point_scale_factor: f32,
) -> bool {
    if last.computed_height < 0.0 || last.computed_width < 0.0 {
        return false;
    }
    let snap = |value: f32| {
        if point_scale_factor == 0.0 {
            value
        } else {
            round_value_to_pixel_grid(f64::from(value), f64::from(point_scale_factor), false, false)
        }
    };

    let same_width_spec = last.width_measure_mode == request.width_mode
        && floats_equal(snap(last.available_width), snap(request.available_width));
    let same_height_spec = last.height_measure_mode == request.height_mode
        && floats_equal(snap(last.available_height), snap(request.available_height));

    let width_compatible = same_width_spec
        || axis_compatible(
            request.width_mode,
            request.available_width - margin_row,
            last.width_measure_mode,
            last.available_width,
            last.computed_width,
        );
    let height_compatible = same_height_spec
        || axis_compatible(
            request.height_mode,
            request.available_height - margin_column,
            last.height_measure_mode,
            last.available_height,
            last.computed_height,
        );
    width_compatible && height_compatible
}

fn axis_compatible(
    mode: MeasureMode,
    size: f32,
    last_mode: MeasureMode,
    last_size: f32,
    last_computed: f32,
) -> bool {
    let fits = size >= last_computed || floats_equal(size, last_computed);
    // Exact request for the size we already produced.
    (mode == MeasureMode::Exactly && floats_equal(size, last_computed))
        // Unconstrained result still fits under the new bound.
        || (mode == MeasureMode::AtMost && last_mode == MeasureMode::Undefined && fits)
        // Tighter bound that the old result still satisfies.
        || (last_mode == MeasureMode::AtMost
            && mode == MeasureMode::AtMost
            && !is_undefined(last_size)
            && !is_undefined(size)
            && !is_undefined(last_computed)
            && last_size > size
            && (last_computed <= size || floats_equal(size, last_computed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LayoutPassReason;
    use sprig_values::{Direction, UNDEFINED};

    fn request(width: f32, width_mode: MeasureMode, height: f32, height_mode: MeasureMode) -> LayoutRequest {
        LayoutRequest {
            available_width: width,
            available_height: height,
            owner_direction: Direction::Ltr,
            width_mode,
            height_mode,
            owner_width: UNDEFINED,
            owner_height: UNDEFINED,
            perform_layout: false,
            reason: LayoutPassReason::MeasureChild,
        }
    }

    fn entry(width: f32, width_mode: MeasureMode, computed_width: f32) -> CachedMeasurement {
        CachedMeasurement {
            available_width: width,
            available_height: 100.0,
            width_measure_mode: width_mode,
            height_measure_mode: MeasureMode::Exactly,
            computed_width,
            computed_height: 100.0,
        }
    }

    #[test]
    /// # Panics
    /// Panics if an identical request misses the cache.
    fn identical_request_hits() {
        let last = entry(50.0, MeasureMode::AtMost, 30.0);
        let query = request(50.0, MeasureMode::AtMost, 100.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&query, &last, 0.0, 0.0, 1.0));
    }

    #[test]
    /// # Panics
    /// Panics if an exact request for the produced size misses.
    fn exact_request_for_computed_size_hits() {
        let last = entry(UNDEFINED, MeasureMode::Undefined, 30.0);
        let query = request(30.0, MeasureMode::Exactly, 100.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&query, &last, 0.0, 0.0, 1.0));
    }

    #[test]
    /// # Panics
    /// Panics if bounds that still fit the old result miss, or bounds that do not fit hit.
    fn at_most_reuses_only_fitting_results() {
        let unconstrained = entry(UNDEFINED, MeasureMode::Undefined, 30.0);
        let roomy = request(40.0, MeasureMode::AtMost, 100.0, MeasureMode::Exactly);
        let cramped = request(20.0, MeasureMode::AtMost, 100.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&roomy, &unconstrained, 0.0, 0.0, 1.0));
        assert!(!can_use_cached_measurement(&cramped, &unconstrained, 0.0, 0.0, 1.0));

        let bounded = entry(60.0, MeasureMode::AtMost, 30.0);
        assert!(can_use_cached_measurement(&roomy, &bounded, 0.0, 0.0, 1.0));
        assert!(!can_use_cached_measurement(&cramped, &bounded, 0.0, 0.0, 1.0));
    }

    #[test]
    /// # Panics
    /// Panics if margins are not removed before comparing sizes.
    fn margins_are_subtracted() {
        let last = entry(UNDEFINED, MeasureMode::Undefined, 30.0);
        let query = request(40.0, MeasureMode::Exactly, 100.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&query, &last, 10.0, 0.0, 1.0));
    }

    #[test]
    /// # Panics
    /// Panics if negative computed sizes are reused.
    fn negative_results_never_hit() {
        let last = CachedMeasurement::default();
        let query = request(-1.0, MeasureMode::Undefined, -1.0, MeasureMode::Undefined);
        assert!(!can_use_cached_measurement(&query, &last, 0.0, 0.0, 1.0));
    }
}
