//! Shared fixtures for the integration tests

use embalses::ScraperConfig;
use url::Url;
use wiremock::MockServer;

/// Config pointed at a mock server's `/bolehSRV`.
pub fn config_for(server: &MockServer) -> ScraperConfig {
    ScraperConfig {
        endpoint: Url::parse(&format!("{}/bolehSRV", server.uri())).unwrap(),
        accept_invalid_certs: false,
        timeout_secs: 10,
        ..Default::default()
    }
}

/// Availability answer naming the latest bulletin.
pub fn availability_page(week: u32, year: i32) -> String {
    format!(
        r#"<html><body><table>
<tr><td class="tdblanco" align="center">BOLETÍN HIDROLÓGICO SEMANAL<br>NÚMERO {week} AÑO {year}</td></tr>
</table></body></html>"#
    )
}

/// District answer with one reservoir row per name.
pub fn district_page(reservoirs: &[&str]) -> String {
    let rows: String = reservoirs
        .iter()
        .map(|name| {
            format!(
                "<tr><td>{name}</td><td>Río</td><td>100</td><td>50</td><td>1</td><td>2</td><td>3</td></tr>"
            )
        })
        .collect();
    format!(
        r#"<html><body><table>
<tr><td colspan="7">Reserva hidráulica</td></tr>
<tr><td>Embalse</td><td>Río</td><td>Capacidad</td><td>Embalsada (hm3)</td><td>Dif.</td><td>Energía</td><td>Cap. energética</td></tr>
{rows}
</table></body></html>"#
    )
}

/// District answer without the reservoir table.
#[allow(dead_code)]
pub fn empty_page() -> String {
    "<html><body><p>No hay datos para la fecha seleccionada</p></body></html>".to_string()
}
