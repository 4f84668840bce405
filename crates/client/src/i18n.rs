use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Pl,
}

pub struct Translations {
    pub top: &'static str,
    pub new: &'static str,
    pub percent: &'static str,
    pub communities: &'static str,
    pub search_placeholder: &'static str,
    pub go_to_store: &'static str,
    pub generic_error: &'static str,
    pub login_to_vote: &'static str,
    pub no_deals: &'static str,
}

const EN: Translations = Translations {
    top: "Top",
    new: "New",
    percent: "-%",
    communities: "Communities",
    search_placeholder: "Search deals...",
    go_to_store: "Go to store",
    generic_error: "Something went wrong",
    login_to_vote: "Log in to vote",
    no_deals: "No deals match these filters",
};

const PL: Translations = Translations {
    top: "Top",
    new: "Nowe",
    percent: "-%",
    communities: "Społeczności",
    search_placeholder: "Szukaj okazji...",
    go_to_store: "Przejdź do sklepu",
    generic_error: "Coś poszło nie tak",
    login_to_vote: "Zaloguj się, aby głosować",
    no_deals: "Brak okazji dla tych filtrów",
};

impl Language {
    pub fn t(&self) -> &'static Translations {
        match self {
            Language::En => &EN,
            Language::Pl => &PL,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "pl" => Ok(Language::Pl),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}
