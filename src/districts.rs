/// A river-basin district ("demarcación") as addressed by the bulletin form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct District {
    pub name: &'static str,
    pub code: &'static str,
}

impl District {
    /// Form key that selects this district's report button.
    pub fn button_key(&self) -> String {
        format!("btnMod_Reserva_Hidraulica_Datos_{}_X17", self.code)
    }

    /// Value submitted alongside [`District::button_key`].
    pub fn button_value(&self) -> String {
        format!("btnMod_Reserva_Hidraulica_Datos_{}", self.code)
    }
}

/// The districts queried for every week, in output order.
pub static DISTRICTS: &[District] = &[
    District { name: "Cantabrico Oriental", code: "17" },
    District { name: "Cantabrico Occidental", code: "12" },
    District { name: "Mino-Sil", code: "1" },
    District { name: "Galicia Costa", code: "14" },
    District { name: "Cuencas Internas del País Vasco", code: "11" },
    District { name: "Duero", code: "2" },
    District { name: "Tajo", code: "3" },
    District { name: "Guadiana", code: "4" },
    District { name: "Tinto, Odiel y Piedras", code: "16" },
    District { name: "Guadalete-Barbate", code: "15" },
    District { name: "Guadalquivir", code: "5" },
    District { name: "Cuenca Mediterránea Andaluza", code: "6" },
    District { name: "Segura", code: "7" },
    District { name: "Júcar", code: "8" },
    District { name: "Ebro", code: "9" },
    District { name: "Cuencas Internas de Cataluña", code: "10" },
];
