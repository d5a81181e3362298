use itertools::Itertools;

use crate::{
    errors::{ParseErr, RazborResult},
    morph::{reading::Analysis, token::Token},
};

/// Разбор выходного потока анализатора.
///
/// Блоки разделяются пустой строкой, один блок на словоформу; каждая строка
/// блока - один кандидат: `словоформа\tразбор\tвес`. Строка с другим числом
/// полей - фатальная ошибка: в этом потоке каждая строка обязана быть
/// кандидатом-чтением.
pub fn parse(stream: &str) -> RazborResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut surface: Option<String> = None;
    let mut readings: Vec<Analysis> = Vec::new();

    for line in stream.lines() {
        if line.trim().is_empty() {
            flush(&mut tokens, &mut surface, &mut readings);
            continue;
        }

        let mut fields = line.split('\t');
        let (Some(orig), Some(raw), Some(weight), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(ParseErr::MalformedLine(line.to_string()).into());
        };

        // Подряд идущие строки одной словоформы копятся в один токен.
        if surface.as_deref() != Some(orig) {
            flush(&mut tokens, &mut surface, &mut readings);
            surface = Some(orig.to_string());
        }

        if let Some(analysis) = Analysis::readify(raw, weight, None)? {
            readings.push(analysis);
        }
    }
    flush(&mut tokens, &mut surface, &mut readings);

    Ok(tokens)
}

fn flush(tokens: &mut Vec<Token>, surface: &mut Option<String>, readings: &mut Vec<Analysis>) {
    if let Some(orig) = surface.take() {
        tokens.push(Token::new(orig, std::mem::take(readings), Vec::new()));
    }
}

/// Сериализация токенов обратно в нативный поток анализатора.
pub fn serialize(tokens: &[Token]) -> String {
    let mut stream = tokens.iter().map(|token| token.hfst_stream()).join("\n\n");
    stream.push_str("\n\n");
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RazborErr;

    const STREAM: &str = "\
слово\tслово+N+Neu+Inan+Sg+Nom\t5.000000
слово\tслово+N+Neu+Inan+Sg+Acc\t5.000000

полчаса\tпол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count\t0.000000

гуглил\tгуглил+?\tinf
";

    #[test]
    fn test_parse_blocks() {
        let tokens = parse(STREAM).unwrap();
        assert_eq!(tokens.len(), 3);

        assert_eq!(tokens[0].orig(), "слово");
        assert_eq!(tokens[0].readings().len(), 2);

        assert_eq!(tokens[1].orig(), "полчаса");
        assert_eq!(tokens[1].readings().len(), 1);
        assert_eq!(tokens[1].readings()[0].lemma(), "пол_час");

        assert_eq!(tokens[2].orig(), "гуглил");
        assert!(tokens[2].is_unknown());
    }

    #[test]
    fn test_parse_groups_consecutive_surfaces() {
        // Словоформа сменилась без пустой строки - это новый токен.
        let stream = "он\tон+Pron+Pers+Msc+Sg+Nom\t0.0\nона\tона+Pron+Pers+Fem+Sg+Nom\t0.0\n";
        let tokens = parse(stream).unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_parse_malformed_line_is_fatal() {
        let err = parse("слово\tслово+N+Neu+Inan+Sg+Nom\n").unwrap_err();
        assert!(matches!(
            err,
            RazborErr::Parse(ParseErr::MalformedLine(line)) if line.starts_with("слово")
        ));
    }

    #[test]
    fn test_roundtrip() {
        let tokens = parse(STREAM).unwrap();
        let reparsed = parse(&serialize(&tokens)).unwrap();
        assert_eq!(tokens, reparsed);
    }
}
