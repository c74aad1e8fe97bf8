//! Presets for the spirograph playground page.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Drawing {
  pub inner_radius: i32,
  pub phase_angle:  i32,
  pub offset:       i32,
  pub color:        &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
  pub title:       &'static str,
  pub description: &'static str,
  pub drawings:    &'static [Drawing],
}

pub const PRESETS: &[Preset] = &[
  Preset {
    title:       "2 rotations",
    description: "The common factor is 4",
    drawings:    &[Drawing {
      inner_radius: 20,
      phase_angle:  0,
      offset:       25,
      color:        "#3b82f6",
    }],
  },
  Preset {
    title:       "Single rotation",
    description: "An offset of 0 with a radius that is a multiple of the \
                  fixed radius only makes 1 rotation.",
    drawings:    &[Drawing {
      inner_radius: 50,
      phase_angle:  0,
      offset:       0,
      color:        "#ec4899",
    }],
  },
  Preset {
    title:       "Many rotation",
    description: "Prime numbers and those with high common factors make \
                  many rotations",
    drawings:    &[Drawing {
      inner_radius: 13,
      phase_angle:  0,
      offset:       37,
      color:        "#f0abfc",
    }],
  },
  Preset {
    title:       "Combos",
    description: "Just some pretty combinations",
    drawings:    &[
      Drawing {
        inner_radius: 26,
        phase_angle:  0,
        offset:       -84,
        color:        "#8b5cf6",
      },
      Drawing {
        inner_radius: 126,
        phase_angle:  0,
        offset:       63,
        color:        "#0d9488",
      },
      Drawing {
        inner_radius: 20,
        phase_angle:  0,
        offset:       25,
        color:        "#f97316",
      },
    ],
  },
];
