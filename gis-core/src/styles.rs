use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    /// Diameter in pixels.
    pub size: u32,
}

impl MarkerStyle {
    pub fn radius(&self) -> f64 {
        f64::from(self.size) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
}

pub const INCIDENT_MARKER: MarkerStyle = MarkerStyle {
    color: "#dc3545",
    size: 16,
};

const DEFAULT_LINE: LineStyle = LineStyle {
    color: "#0d6efd",
    weight: 2,
    opacity: 0.8,
};

const AXIS_LINES: &[(&str, &str, u32)] = &[
    ("CASABLANCA", "#dc3545", 4),
    ("RABAT", "#198754", 4),
    ("FES", "#ffc107", 3),
    ("MARRAKECH", "#fd7e14", 3),
    ("TANGER", "#6f42c1", 3),
    ("AGADIR", "#20c997", 2),
];

pub fn station_marker(kind: Option<&str>) -> MarkerStyle {
    let kind = kind.map(str::to_uppercase);
    match kind.as_deref() {
        Some("PRINCIPALE" | "MAJOR") => MarkerStyle {
            color: "#dc3545",
            size: 20,
        },
        Some("SECONDAIRE" | "MINOR") => MarkerStyle {
            color: "#198754",
            size: 16,
        },
        _ => MarkerStyle {
            color: "#0d6efd",
            size: 14,
        },
    }
}

pub fn segment_line(axis: Option<&str>) -> LineStyle {
    let Some(axis) = axis else {
        return DEFAULT_LINE;
    };
    let axis = axis.trim().to_uppercase();
    AXIS_LINES
        .iter()
        .find(|(name, _, _)| *name == axis)
        .map_or(DEFAULT_LINE, |&(_, color, weight)| LineStyle {
            color,
            weight,
            ..DEFAULT_LINE
        })
}

/// Legend rows for the segment layer, in display order.
pub fn axis_legend() -> impl Iterator<Item = (&'static str, LineStyle)> {
    AXIS_LINES
        .iter()
        .map(|&(name, _, _)| (name, segment_line(Some(name))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_type_is_case_insensitive() {
        assert_eq!(station_marker(Some("principale")).size, 20);
        assert_eq!(station_marker(Some("MINOR")).color, "#198754");
        assert_eq!(station_marker(Some("HALTE")), station_marker(None));
    }

    #[test]
    fn casablanca_axis_is_heavy_red() {
        let style = segment_line(Some("CASABLANCA"));
        assert_eq!((style.color, style.weight), ("#dc3545", 4));
        assert_eq!(style.opacity, 0.8);
        assert_eq!(segment_line(Some("OUJDA")), DEFAULT_LINE);
        assert_eq!(axis_legend().count(), 6);
    }
}
