// hf-core/src/units.rs
//
// Block equations are unit-agnostic: a model is written in one consistent unit
// system and the solver never converts. These helpers only map raw solution
// values onto uom quantities for reporting.

use uom::si::f64::{Pressure as UomPressure, Volume as UomVolume, VolumeRate as UomVolumeRate};

pub type Pressure = UomPressure;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

/// Unit system a model description is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnitSystem {
    /// dyn/cm², cm³/s, cm³ (the usual choice for 0D hemodynamics)
    #[default]
    Cgs,
    /// Pa, m³/s, m³
    Si,
}

impl UnitSystem {
    #[inline]
    pub fn pressure(self, v: f64) -> Pressure {
        use uom::si::pressure::{dyne_per_square_centimeter, pascal};
        match self {
            UnitSystem::Cgs => Pressure::new::<dyne_per_square_centimeter>(v),
            UnitSystem::Si => Pressure::new::<pascal>(v),
        }
    }

    #[inline]
    pub fn flow(self, v: f64) -> VolumeRate {
        use uom::si::volume_rate::{cubic_centimeter_per_second, cubic_meter_per_second};
        match self {
            UnitSystem::Cgs => VolumeRate::new::<cubic_centimeter_per_second>(v),
            UnitSystem::Si => VolumeRate::new::<cubic_meter_per_second>(v),
        }
    }

    #[inline]
    pub fn volume(self, v: f64) -> Volume {
        use uom::si::volume::{cubic_centimeter, cubic_meter};
        match self {
            UnitSystem::Cgs => Volume::new::<cubic_centimeter>(v),
            UnitSystem::Si => Volume::new::<cubic_meter>(v),
        }
    }
}

#[inline]
pub fn to_mmhg(p: Pressure) -> f64 {
    use uom::si::pressure::millimeter_of_mercury;
    p.get::<millimeter_of_mercury>()
}

#[inline]
pub fn to_ml_per_s(q: VolumeRate) -> f64 {
    use uom::si::volume_rate::milliliter_per_second;
    q.get::<milliliter_per_second>()
}

#[inline]
pub fn to_ml(v: Volume) -> f64 {
    use uom::si::volume::milliliter;
    v.get::<milliliter>()
}
