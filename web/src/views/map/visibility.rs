/// The two overlays the sidebar can switch on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerName {
    Earthquakes,
    Outdoors,
}

impl LayerName {
    pub const ALL: [LayerName; 2] = [LayerName::Earthquakes, LayerName::Outdoors];

    /// Layer and source id on the map surface.
    pub fn id(self) -> &'static str {
        match self {
            LayerName::Earthquakes => "earthquakes",
            LayerName::Outdoors => "outdoors",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LayerName::Earthquakes => "Earthquakes",
            LayerName::Outdoors => "Outdoors",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerVisibility {
    pub earthquakes: bool,
    pub outdoors: bool,
}

impl LayerVisibility {
    pub fn toggle(&mut self, layer: LayerName) {
        let flag = self.flag_mut(layer);
        *flag = !*flag;
    }

    pub fn is_visible(&self, layer: LayerName) -> bool {
        match layer {
            LayerName::Earthquakes => self.earthquakes,
            LayerName::Outdoors => self.outdoors,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerName, bool)> + '_ {
        LayerName::ALL
            .into_iter()
            .map(move |layer| (layer, self.is_visible(layer)))
    }

    fn flag_mut(&mut self, layer: LayerName) -> &mut bool {
        match layer {
            LayerName::Earthquakes => &mut self.earthquakes,
            LayerName::Outdoors => &mut self.outdoors,
        }
    }
}
