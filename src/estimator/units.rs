//! Body measurement conversion constants

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

/// Centimeters per inch
pub const CM_PER_IN: f64 = 2.54;

/// Energy density of protein (kcal per gram)
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;

/// Energy density of carbohydrate (kcal per gram)
pub const KCAL_PER_G_CARBS: f64 = 4.0;

/// Energy density of fat (kcal per gram)
pub const KCAL_PER_G_FAT: f64 = 9.0;

pub fn lb_to_kg(lb: f64) -> f64 {
    lb * KG_PER_LB
}

pub fn in_to_cm(inches: f64) -> f64 {
    inches * CM_PER_IN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lb_to_kg() {
        assert!((lb_to_kg(100.0) - 45.3592).abs() < 1e-9);
        assert_eq!(lb_to_kg(0.0), 0.0);
    }

    #[test]
    fn test_in_to_cm() {
        assert!((in_to_cm(70.0) - 177.8).abs() < 1e-9);
    }
}
