use crate::models::{Step, UserSession};

const BASE_PROMPT: &str = "Sei un assistente vocale per un servizio clienti tecnico in Svizzera. \
Parli sempre in italiano e sei cordiale, professionale e disponibile.

IMPORTANTE: Le tue risposte devono essere BREVI e CHIARE perché saranno convertite in audio. \
Evita testi troppo lunghi, usa frasi semplici e dirette.
";

const SERVICE_MENU: &str = "
FASE ATTUALE: Menu servizi (dati personali completi)

L'utente può scegliere tra:
1. Supporto tecnico immediato
2. Prenotare un appuntamento

Fornisci assistenza tecnica per problemi comuni o guida verso la prenotazione.
";

const BOOKING: &str = "
FASE ATTUALE: Prenotazione appuntamento

Raccogli le informazioni per l'appuntamento:
- Data preferita
- Ora preferita
- Motivo dell'appuntamento

Guida l'utente passo dopo passo.
";

pub const EXTRACTION_PROMPT: &str = "Estrai i dati personali dal messaggio dell'utente.

Campi ammessi (usa esattamente queste chiavi):
- first_name (nome)
- last_name (cognome)
- street_address (via e numero civico)
- city_postal (paese e codice postale)
- phone (telefono)
- email

Restituisci SOLO un oggetto JSON con i campi presenti nel messaggio, senza testo aggiuntivo.
Se non trovi nessun dato restituisci {}.";

pub fn system_prompt(session: &UserSession) -> String {
    let phase = match session.step {
        Step::CollectingData => {
            let missing = session
                .user_data
                .missing_fields()
                .iter()
                .map(|f| f.label())
                .collect::<Vec<_>>()
                .join(", ");
            let known = serde_json::Value::Object(session.user_data.known_fields());
            format!(
                "
FASE ATTUALE: Raccolta dati personali obbligatoria

Devi raccogliere questi dati mancanti dell'utente:
{missing}

Chiedi UN SOLO dato alla volta in modo naturale e cordiale.
Spiega che questi dati sono necessari per fornire assistenza personalizzata.

Dati già raccolti: {known}
"
            )
        }
        Step::ServiceMenu => SERVICE_MENU.to_string(),
        Step::BookingAppointment => BOOKING.to_string(),
    };

    format!("{BASE_PROMPT}{phase}")
}

pub fn extraction_request(message: &str, known: &serde_json::Map<String, serde_json::Value>) -> String {
    let known = serde_json::Value::Object(known.clone());
    format!("Dati attuali: {known}\nMessaggio utente: \"{message}\"")
}
