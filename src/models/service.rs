//! Service catalog

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A bookable service offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceOffering {
    pub id: String,
    pub nombre: String,
    /// Duration label, e.g. "45 min"
    pub duracion: String,
    /// Price in whole currency units
    pub precio: i32,
    pub descripcion: String,
}

impl ServiceOffering {
    /// Offerings of the reference deployment
    pub fn reference_catalog() -> Vec<ServiceOffering> {
        vec![
            ServiceOffering {
                id: "corte-clasico".to_string(),
                nombre: "Corte Clásico".to_string(),
                duracion: "30 min".to_string(),
                precio: 22000,
                descripcion: "Corte a máquina y tijera con terminación a navaja".to_string(),
            },
            ServiceOffering {
                id: "corte-personalizado".to_string(),
                nombre: "Corte Personalizado".to_string(),
                duracion: "45 min".to_string(),
                precio: 28000,
                descripcion: "Asesoramiento de estilo, corte, lavado y peinado".to_string(),
            },
            ServiceOffering {
                id: "corte-barba".to_string(),
                nombre: "Corte + Barba".to_string(),
                duracion: "1h 15min".to_string(),
                precio: 35000,
                descripcion: "Corte personalizado con perfilado de barba y toalla caliente".to_string(),
            },
        ]
    }
}

/// Find an offering by id
pub fn find_offering<'a>(catalog: &'a [ServiceOffering], id: &str) -> Option<&'a ServiceOffering> {
    catalog.iter().find(|s| s.id == id)
}
