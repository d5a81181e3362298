use itertools::Itertools;

use crate::morph::{
    reading::{Analysis, MultiReading, Reading, COMPOUND_SEP},
    token::Token,
};

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}",
            self.lemma(),
            self.tags().iter().map(|tag| tag.name()).join("_")
        )
    }
}

impl std::fmt::Display for MultiReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .readings()
            .iter()
            .map(|sub| sub.to_string())
            .join(&COMPOUND_SEP.to_string());
        write!(f, "{joined}")
    }
}

impl std::fmt::Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Analysis::Reading(reading) => write!(f, "{reading}"),
            Analysis::Multi(multi) => write!(f, "{multi}"),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hfst_stream())
    }
}

#[cfg(test)]
mod test {
    use crate::morph::reading::Analysis;

    #[test]
    fn test_display() {
        let flat = Analysis::readify("слово+N+Neu+Inan+Sg+Nom", "0.0", None)
            .unwrap()
            .unwrap();
        assert_eq!(flat.to_string(), "слово_N_Neu_Inan_Sg_Nom");

        let compound = Analysis::readify("пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count", "0.0", None)
            .unwrap()
            .unwrap();
        assert_eq!(
            compound.to_string(),
            "пол_Num_Acc#час_N_Msc_Inan_Sg_Gen_Count"
        );
    }
}
