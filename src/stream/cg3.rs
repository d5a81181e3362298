use itertools::Itertools;
use tracing::warn;

use crate::{
    errors::RazborResult,
    morph::{
        reading::{Analysis, COMPOUND_SEP},
        token::Token,
    },
};

/// Разбор выходного потока дизамбигуатора.
///
/// Поток состоит из блоков вида
/// ```text
/// "<полчаса>"
///     "час" N Msc Inan Sg Gen Count <W:0.000000>
///         "пол" Num Acc <W:0.000000>
/// ;   "час" N Msc Inan Sg Gen Count <W:0.000000>
/// ```
/// где глубина табуляции кодирует вложенность под-чтений, а ведущий `;` -
/// чтение, снятое дизамбигуацией. Количество токенов на выходе равно
/// количеству заголовков `"<...>"`, порядок сохраняется. Нераспознанные
/// непустые строки логируются и пропускаются.
pub fn parse(stream: &str) -> RazborResult<Vec<Token>> {
    let mut parser = Cg3Parser::default();
    for line in stream.lines() {
        parser.feed(line)?;
    }
    parser.finish()
}

#[derive(Default)]
/// Явная машина состояний построчного разбора: вместо переменных,
/// переживающих итерации цикла, - накопители текущего токена и
/// собираемого чтения, с явным финальным сбросом в конце потока.
struct Cg3Parser {
    tokens: Vec<Token>,
    surface: Option<String>,
    kept: Vec<Analysis>,
    removed: Vec<Analysis>,
    pending: Option<Pending>,
}

/// Чтение, накапливаемое по строкам: под-чтения глубже первого уровня
/// пристыковываются к нативной форме спереди через `#`.
struct Pending {
    raw: String,
    weight: String,
    cg_rule: Option<String>,
    removed: bool,
}

impl Cg3Parser {
    fn feed(&mut self, line: &str) -> RazborResult<()> {
        if let Some(surface) = parse_header(line) {
            self.flush_reading()?;
            self.flush_token();
            self.surface = Some(surface.to_string());
            return Ok(());
        }

        match parse_reading_line(line) {
            Some(reading) if reading.depth == 1 => {
                self.flush_reading()?;
                self.pending = Some(Pending {
                    raw: reading.raw(),
                    weight: reading.weight.to_string(),
                    cg_rule: reading.rule.map(|rule| rule.to_string()),
                    removed: reading.removed,
                });
            }
            Some(reading) => match &mut self.pending {
                // Более глубокая строка - под-чтение: её сегмент становится
                // первым в собираемой нативной форме.
                Some(pending) => {
                    pending.raw = format!("{}{}{}", reading.raw(), COMPOUND_SEP, pending.raw);
                    pending.weight = reading.weight.to_string();
                    pending.cg_rule = reading.rule.map(|rule| rule.to_string());
                }
                None => warn!("Sub-reading line without reading: {line}"),
            },
            None => {
                if !line.trim().is_empty() {
                    warn!("Unrecognized CG3 line: {line}");
                }
            }
        }
        Ok(())
    }

    /// Закрытие собираемого чтения в нужную половину разбиения.
    /// Чтение вне когорты (до первого заголовка) отбрасывается.
    fn flush_reading(&mut self) -> RazborResult<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if self.surface.is_none() {
            warn!("Reading line before any cohort header: {}", pending.raw);
            return Ok(());
        }
        if let Some(analysis) =
            Analysis::readify(&pending.raw, &pending.weight, pending.cg_rule.as_deref())?
        {
            if pending.removed {
                self.removed.push(analysis);
            } else {
                self.kept.push(analysis);
            }
        }
        Ok(())
    }

    fn flush_token(&mut self) {
        if let Some(orig) = self.surface.take() {
            self.tokens.push(Token::new(
                orig,
                std::mem::take(&mut self.kept),
                std::mem::take(&mut self.removed),
            ));
        }
    }

    /// Явный финальный переход: сброс последнего чтения и токена.
    fn finish(mut self) -> RazborResult<Vec<Token>> {
        self.flush_reading()?;
        self.flush_token();
        Ok(self.tokens)
    }
}

/// Заголовок когорты `"<словоформа>"`.
fn parse_header(line: &str) -> Option<&str> {
    line.strip_prefix("\"<")?.strip_suffix(">\"")
}

struct ReadingLine<'a> {
    removed: bool,
    depth: usize,
    lemma: &'a str,
    tags: &'a str,
    weight: &'a str,
    rule: Option<&'a str>,
}

impl ReadingLine<'_> {
    /// Нативная форма строки: `лемма+Тег+Тег`.
    fn raw(&self) -> String {
        format!("{}+{}", self.lemma, self.tags.replace(' ', "+"))
    }
}

/// Строка чтения: `[;]табы"лемма" Тег Тег <W:вес>[ правило]`.
fn parse_reading_line(line: &str) -> Option<ReadingLine<'_>> {
    let (removed, rest) = match line.strip_prefix(';') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let depth = rest.bytes().take_while(|byte| *byte == b'\t').count();
    if depth == 0 {
        return None;
    }
    let rest = rest[depth..].strip_prefix('"')?;

    let weight_at = rest.rfind(" <W:")?;
    let (left, tail) = rest.split_at(weight_at);
    let tail = &tail[" <W:".len()..];
    let closing = tail.find('>')?;
    let weight = &tail[..closing];
    let rule = match tail[closing + 1..].trim() {
        "" => None,
        rule => Some(rule),
    };

    // Лемма может содержать кавычки: закрывающей считается последняя `" `.
    let (lemma, tags) = match left.rfind("\" ") {
        Some(quote_at) => (&left[..quote_at], &left[quote_at + 2..]),
        None => (left.strip_suffix('"')?, ""),
    };

    Some(ReadingLine {
        removed,
        depth,
        lemma,
        tags,
        weight,
        rule,
    })
}

/// Сериализация токенов в поток дизамбигуатора.
///
/// `with_removed` включает в поток снятые чтения с префиксом `;`;
/// на вход дизамбигуатору подаются только оставленные.
pub fn serialize(tokens: &[Token], traces: bool, with_removed: bool) -> String {
    let mut stream = tokens
        .iter()
        .map(|token| token.cg3_str(traces, with_removed))
        .join("\n");
    stream.push_str("\n\n");
    stream
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISAMBIGUATED: &str = "\"<полчаса>\"
\t\"час\" N Msc Inan Sg Gen Count <W:0.000000>
\t\t\"пол\" Num Acc <W:0.000000>
;\t\"час\" N Msc Inan Sg Gen Count <W:0.000000>
;\t\t\"пол\" Num Nom <W:0.000000>
\"<спустя>\"
\t\"спустя\" Adv <W:0.000000> SELECT:123
;\t\"спустя\" Pr <W:0.000000> REMOVE:456
";

    #[test]
    fn test_parse_compound_nesting() {
        let tokens = parse(DISAMBIGUATED).unwrap();
        assert_eq!(tokens.len(), 2);

        let token = &tokens[0];
        assert_eq!(token.orig(), "полчаса");
        assert_eq!(token.readings().len(), 1);
        assert_eq!(token.removed_readings().len(), 1);
        assert_eq!(
            token.readings()[0].hfst_str(),
            "пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count"
        );
        assert_eq!(
            token.removed_readings()[0].hfst_str(),
            "пол+Num+Nom#час+N+Msc+Inan+Sg+Gen+Count"
        );
    }

    #[test]
    fn test_parse_captures_rule_traces() {
        let tokens = parse(DISAMBIGUATED).unwrap();
        let token = &tokens[1];
        assert_eq!(token.readings()[0].cg_rule(), Some("SELECT:123"));
        assert_eq!(token.removed_readings()[0].cg_rule(), Some("REMOVE:456"));
    }

    #[test]
    fn test_parse_removed_partition() {
        let stream = "\"<полчаса>\"
\t\"полчаса\" N Msc Inan Sg Acc <W:0.000000>
;\t\"полчаса\" N Msc Inan Sg Nom <W:0.000000>
";
        let tokens = parse(stream).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].readings().len(), 1);
        assert_eq!(tokens[0].removed_readings().len(), 1);
    }

    #[test]
    fn test_token_count_equals_header_count() {
        let headers = DISAMBIGUATED
            .lines()
            .filter(|line| parse_header(line).is_some())
            .count();
        let tokens = parse(DISAMBIGUATED).unwrap();
        assert_eq!(tokens.len(), headers);
    }

    #[test]
    fn test_unrecognized_lines_are_skipped() {
        let stream = "# диагностика дизамбигуатора
\"<слово>\"

\t\"слово\" N Neu Inan Sg Nom <W:0.000000>
мусорная строка
";
        let tokens = parse(stream).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].readings().len(), 1);
    }

    #[test]
    fn test_reading_before_first_header_is_discarded() {
        // Строка чтения до первого заголовка не принадлежит ни одной
        // когорте и не должна просочиться в следующую.
        let stream = "\t\"мусор\" N Msc Inan Sg Nom <W:0.000000>
\"<слово>\"
\t\"слово\" N Neu Inan Sg Nom <W:0.000000>
";
        let tokens = parse(stream).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].readings().len(), 1);
        assert_eq!(tokens[0].readings()[0].lemma(), "слово");
        assert!(tokens[0].removed_readings().is_empty());
    }

    #[test]
    fn test_lemma_with_quotes() {
        let line = "\t\"о\\\"город\" N Msc Inan Sg Nom <W:0.100000>";
        let parsed = parse_reading_line(line).unwrap();
        assert_eq!(parsed.lemma, "о\\\"город");
        assert_eq!(parsed.tags, "N Msc Inan Sg Nom");
        assert_eq!(parsed.weight, "0.100000");
    }

    #[test]
    fn test_roundtrip() {
        let tokens = parse(DISAMBIGUATED).unwrap();
        let reparsed = parse(&serialize(&tokens, true, true)).unwrap();
        assert_eq!(tokens, reparsed);
    }

    #[test]
    fn test_serialize_kept_only() {
        let tokens = parse(DISAMBIGUATED).unwrap();
        let stream = serialize(&tokens, false, false);
        assert!(!stream.contains(';'));
        let reparsed = parse(&stream).unwrap();
        assert!(reparsed
            .iter()
            .all(|token| token.removed_readings().is_empty()));
    }
}
