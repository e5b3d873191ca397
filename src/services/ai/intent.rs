pub trait BookingIntent: Send + Sync {
    fn wants_booking(&self, message: &str) -> bool;
}

pub struct KeywordIntent {
    keywords: Vec<String>,
}

impl KeywordIntent {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    pub fn italian() -> Self {
        Self::new(["appuntamento", "prenota", "prenotazione", "calendario"])
    }
}

impl Default for KeywordIntent {
    fn default() -> Self {
        Self::italian()
    }
}

impl BookingIntent for KeywordIntent {
    fn wants_booking(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }
}
