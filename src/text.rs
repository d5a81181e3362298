use itertools::{EitherOrBoth, Itertools};
use serde::Serialize;
use tracing::debug;

use crate::{
    errors::{ParseErr, RazborResult},
    morph::{reading::Analysis, token::Token},
    stream, Analyzer, Disambiguator,
};

/// Маркер соответствия пар токенов в отчете об ошибке выравнивания.
const PAIR_MARK: char = '\u{25B6}';

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Последовательность токенов, выровненная по исходному порядку словоформ.
///
/// Последовательность владеет токенами эксклюзивно и сохраняет строгое
/// позиционное соответствие со списком словоформ, из которого собирался
/// поток дизамбигуатора.
pub struct Text {
    tokens: Vec<Token>,
    #[serde(skip)]
    disambiguated: bool,
}

impl Text {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            disambiguated: false,
        }
    }

    /// Разбор каждой словоформы внешним анализатором.
    ///
    /// Пустая словоформа - ошибка валидации на границе токенизации
    /// и анализа, а не повод подставлять заглушку.
    pub fn analyze(surfaces: &[String], analyzer: &impl Analyzer) -> RazborResult<Self> {
        let mut tokens = Vec::with_capacity(surfaces.len());

        for (position, surface) in surfaces.iter().enumerate() {
            if surface.is_empty() {
                return Err(ParseErr::EmptySurface(position).into());
            }
            let mut readings = Vec::new();
            for (raw, weight) in analyzer.analyze(surface)? {
                if let Some(analysis) = Analysis::readify(&raw, &weight, None)? {
                    readings.push(analysis);
                }
            }
            tokens.push(Token::new(surface.clone(), readings, Vec::new()));
        }

        Ok(Self::new(tokens))
    }

    /// Разбор нативного потока анализатора.
    pub fn from_hfst(stream: &str) -> RazborResult<Self> {
        Ok(Self::new(stream::hfst::parse(stream)?))
    }

    /// Разбор потока дизамбигуатора.
    pub fn from_cg3(stream: &str) -> RazborResult<Self> {
        Ok(Self::new(stream::cg3::parse(stream)?))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_disambiguated(&self) -> bool {
        self.disambiguated
    }

    /// Нативный поток анализатора для всей последовательности.
    pub fn hfst_str(&self) -> String {
        stream::hfst::serialize(&self.tokens)
    }

    /// CG3-поток всей последовательности, включая снятые чтения.
    pub fn cg3_str(&self, traces: bool) -> String {
        stream::cg3::serialize(&self.tokens, traces, true)
    }

    /// Полный цикл дизамбигуации: сериализация оставленных чтений,
    /// внешний дизамбигуатор, разбор результата и перенос на токены.
    ///
    /// Оставленные чтения заменяются новыми, снятые добавляются к уже
    /// накопленным: повторные проходы собирают историю, а не затирают её.
    /// Расхождение в количестве токенов - фатальная ошибка с полным
    /// отчетом обеих последовательностей: внешний инструмент потерял
    /// или расщепил токен.
    pub fn disambiguate(&mut self, disambiguator: &impl Disambiguator) -> RazborResult<()> {
        let input = stream::cg3::serialize(&self.tokens, false, false);
        let output = disambiguator.disambiguate(&input)?;
        let new_tokens = stream::cg3::parse(&output)?;

        if new_tokens.len() != self.tokens.len() {
            return Err(self.alignment_err(&new_tokens).into());
        }

        for (token, new) in self.tokens.iter_mut().zip(new_tokens) {
            token.merge(new);
        }
        self.disambiguated = true;
        debug!("Disambiguated {} tokens", self.tokens.len());

        Ok(())
    }

    fn alignment_err(&self, new_tokens: &[Token]) -> ParseErr {
        let pairs = self
            .tokens
            .iter()
            .map(|token| token.orig())
            .zip_longest(new_tokens.iter().map(|token| token.orig()))
            .map(|pair| match pair {
                EitherOrBoth::Both(old, new) => format!("{old} {PAIR_MARK} {new}"),
                EitherOrBoth::Left(old) => format!("{old} {PAIR_MARK}"),
                EitherOrBoth::Right(new) => format!("{PAIR_MARK} {new}"),
            })
            .join("\n");

        ParseErr::Alignment {
            before: self.tokens.len(),
            after: new_tokens.len(),
            pairs,
        }
    }
}

impl std::ops::Index<usize> for Text {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a Text {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hfst_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RazborErr;
    use std::collections::HashMap;

    /// Табличный анализатор: словоформа -> разборы с весами.
    struct TableAnalyzer(HashMap<&'static str, Vec<(&'static str, &'static str)>>);

    impl Analyzer for TableAnalyzer {
        fn analyze(&self, surface: &str) -> RazborResult<Vec<(String, String)>> {
            Ok(self
                .0
                .get(surface)
                .map(|rows| {
                    rows.iter()
                        .map(|(raw, weight)| (raw.to_string(), weight.to_string()))
                        .collect()
                })
                .unwrap_or_else(|| vec![(format!("{surface}+?"), "inf".to_string())]))
        }
    }

    fn analyzer() -> TableAnalyzer {
        TableAnalyzer(HashMap::from([
            (
                "слова",
                vec![
                    ("слово+N+Neu+Inan+Sg+Gen", "5.0"),
                    ("слово+N+Neu+Inan+Pl+Nom", "5.0"),
                    ("слово+N+Neu+Inan+Pl+Acc", "5.0"),
                ],
            ),
            ("полчаса", vec![("пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count", "0.0")]),
        ]))
    }

    /// Дизамбигуатор с заранее подготовленным выходным потоком.
    struct CannedDisambiguator(String);

    impl Disambiguator for CannedDisambiguator {
        fn disambiguate(&self, _cg3_stream: &str) -> RazborResult<String> {
            Ok(self.0.clone())
        }
    }

    fn surfaces(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn test_analyze() {
        let text = Text::analyze(&surfaces(&["слова", "полчаса", "гуглил"]), &analyzer()).unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text[0].readings().len(), 3);
        assert_eq!(text[1].readings().len(), 1);
        assert!(text[2].is_unknown());
    }

    #[test]
    fn test_analyze_empty_surface_is_fatal() {
        let err = Text::analyze(&surfaces(&["слова", ""]), &analyzer()).unwrap_err();
        assert!(matches!(
            err,
            RazborErr::Parse(ParseErr::EmptySurface(1))
        ));
    }

    #[test]
    fn test_disambiguate_merges_partition() {
        let mut text = Text::analyze(&surfaces(&["слова"]), &analyzer()).unwrap();
        let before_merge = text[0].readings().to_vec();

        let output = "\"<слова>\"
\t\"слово\" N Neu Inan Sg Gen <W:5.000000>
;\t\"слово\" N Neu Inan Pl Nom <W:5.000000>
;\t\"слово\" N Neu Inan Pl Acc <W:5.000000>
";
        text.disambiguate(&CannedDisambiguator(output.to_string()))
            .unwrap();

        assert!(text.is_disambiguated());
        assert_eq!(text[0].readings().len(), 1);
        assert_eq!(text[0].removed_readings().len(), 2);
        assert_eq!(text[0].orig(), "слова");

        // Разбиение: каждое исходное чтение ровно в одной половине.
        for before in before_merge {
            let kept = text[0].readings().contains(&before);
            let removed = text[0].removed_readings().contains(&before);
            assert!(kept != removed);
        }

        // Повторный проход накапливает снятые чтения, а не затирает их.
        let second = "\"<слова>\"
\t\"слово\" N Neu Inan Sg Gen <W:5.000000>
";
        text.disambiguate(&CannedDisambiguator(second.to_string()))
            .unwrap();
        assert_eq!(text[0].readings().len(), 1);
        assert_eq!(text[0].removed_readings().len(), 2);
    }

    #[test]
    fn test_disambiguate_alignment_is_fatal() {
        let mut text = Text::analyze(&surfaces(&["слова", "полчаса"]), &analyzer()).unwrap();

        let output = "\"<слова>\"
\t\"слово\" N Neu Inan Sg Gen <W:5.000000>
";
        let err = text
            .disambiguate(&CannedDisambiguator(output.to_string()))
            .unwrap_err();
        match err {
            RazborErr::Parse(ParseErr::Alignment {
                before,
                after,
                pairs,
            }) => {
                assert_eq!(before, 2);
                assert_eq!(after, 1);
                assert!(pairs.contains("полчаса"));
            }
            other => panic!("expected alignment error, got {other}"),
        }
    }

    #[test]
    fn test_cg3_roundtrip_through_text() {
        let text = Text::analyze(&surfaces(&["слова", "полчаса"]), &analyzer()).unwrap();
        let reparsed = Text::from_cg3(&text.cg3_str(false)).unwrap();
        assert_eq!(text.tokens(), reparsed.tokens());
    }
}
