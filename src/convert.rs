//! Conversion between the partwise and timewise layouts
//!
//! Measures are matched by position: the n-th measure of every part forms
//! the n-th timewise measure, which takes its attributes (number, width,
//! implicit flag) from the first part that has it.

use crate::model::{Measure, MusicData, Part, ScoreDocument, ScorePartwise, ScoreTimewise, TimewiseMeasure, TimewisePart};

impl ScoreDocument {
    pub fn to_partwise(&self) -> ScoreDocument {
        self.clone().into_partwise()
    }

    pub fn to_timewise(&self) -> ScoreDocument {
        self.clone().into_timewise()
    }

    pub fn into_partwise(self) -> ScoreDocument {
        match self {
            ScoreDocument::Partwise(_) => self,
            ScoreDocument::Timewise(score) => ScoreDocument::Partwise(timewise_to_partwise(score)),
        }
    }

    pub fn into_timewise(self) -> ScoreDocument {
        match self {
            ScoreDocument::Timewise(_) => self,
            ScoreDocument::Partwise(score) => ScoreDocument::Timewise(partwise_to_timewise(score)),
        }
    }
}

fn partwise_to_timewise(score: ScorePartwise) -> ScoreTimewise {
    let measure_count = score.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0);
    let mut measures: Vec<TimewiseMeasure> = Vec::with_capacity(measure_count);

    // iterate each part's measures once, in order
    let mut part_measures: Vec<(String, std::vec::IntoIter<Measure>)> = score
        .parts
        .into_iter()
        .map(|part| (part.id, part.measures.into_iter()))
        .collect();

    for _ in 0..measure_count {
        let mut timewise: Option<TimewiseMeasure> = None;
        for (id, iter) in part_measures.iter_mut() {
            let Some(measure) = iter.next() else {
                continue;
            };
            let entry = timewise.get_or_insert_with(|| TimewiseMeasure {
                attributes: measure.attributes.clone(),
                parts: Vec::new(),
            });
            entry.parts.push(TimewisePart {
                id: id.clone(),
                music_data: measure.music_data,
            });
        }
        measures.extend(timewise);
    }

    log::debug!("converted {} partwise measures to timewise", measures.len());

    ScoreTimewise {
        version: score.version,
        header: score.header,
        measures,
    }
}

fn timewise_to_partwise(score: ScoreTimewise) -> ScorePartwise {
    let mut parts: Vec<Part> = Vec::new();

    for measure in score.measures {
        for slice in measure.parts {
            let index = match parts.iter().position(|p| p.id == slice.id) {
                Some(index) => index,
                None => {
                    parts.push(Part::new(slice.id.clone()));
                    parts.len() - 1
                }
            };
            parts[index].measures.push(Measure {
                attributes: measure.attributes.clone(),
                music_data: slice.music_data,
            });
        }
    }

    log::debug!("converted timewise score to {} parts", parts.len());

    ScorePartwise {
        version: score.version,
        header: score.header,
        parts,
    }
}

/// Music data of one part, flattened across measures
pub fn part_music_data<'a>(document: &'a ScoreDocument, part_id: &str) -> Vec<&'a MusicData> {
    match document {
        ScoreDocument::Partwise(score) => score
            .parts
            .iter()
            .filter(|part| part.id == part_id)
            .flat_map(|part| part.measures.iter())
            .flat_map(|measure| measure.music_data.iter())
            .collect(),
        ScoreDocument::Timewise(score) => score
            .measures
            .iter()
            .flat_map(|measure| measure.parts.iter())
            .filter(|part| part.id == part_id)
            .flat_map(|part| part.music_data.iter())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{MeasureBuilder, PartBuilder, ScoreBuilder};
    use crate::model::{Note, Step};

    fn sample() -> ScoreDocument {
        ScoreBuilder::new()
            .part(
                PartBuilder::new("P1", "Violin")
                    .measure(MeasureBuilder::new().divisions(1.0).note(Note::pitched(Step::A, 4, 4.0)))
                    .measure(MeasureBuilder::new().note(Note::pitched(Step::B, 4, 4.0))),
            )
            .part(PartBuilder::new("P2", "Cello").measure(MeasureBuilder::new().note(Note::rest(4.0))))
            .build()
    }

    #[test]
    fn test_partwise_to_timewise_groups_by_position() {
        let timewise = sample().to_timewise();
        let ScoreDocument::Timewise(score) = &timewise else {
            panic!("expected a timewise document");
        };

        assert_eq!(score.measures.len(), 2);
        let first: Vec<&str> = score.measures[0].parts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(first, vec!["P1", "P2"]);
        let second: Vec<&str> = score.measures[1].parts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(second, vec!["P1"]);
        assert_eq!(score.measures[1].number(), "2");
    }

    #[test]
    fn test_layout_conversion_is_reversible() {
        let partwise = sample();
        assert_eq!(partwise.to_timewise().to_partwise(), partwise);
        assert_eq!(part_music_data(&partwise, "P1").len(), 3);
        assert_eq!(part_music_data(&partwise.to_timewise(), "P1").len(), 3);
    }
}
