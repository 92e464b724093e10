use body_climate::survey::display::{quadrant_label, signed, MapPosition};
use body_climate::survey::profile;
use body_climate::survey::{
    score, AnswerSet, Axis, Quadrant, ResultView, SurveyId, SurveyRecord, SurveyVersion,
    TypeStatistics,
};
use chrono::{TimeZone, Utc};
use serde_json::json;

fn fill(version: SurveyVersion, axes: &[Axis], intensity: i64) -> AnswerSet {
    let bank = version.bank();
    let mut answers = AnswerSet::new();
    for axis in axes {
        for question in bank.on_axis(*axis) {
            answers
                .try_insert(question.id, intensity)
                .expect("intensity within scale");
        }
    }
    answers
}

#[test]
fn every_quadrant_is_reachable_from_the_short_bank() {
    let cases = [
        (vec![Axis::Heat, Axis::Damp], Quadrant::HeatDamp, 32, 32),
        (vec![Axis::Heat, Axis::Dry], Quadrant::HeatDry, 32, -32),
        (vec![Axis::Cold, Axis::Damp], Quadrant::ColdDamp, -32, 32),
        (vec![Axis::Cold, Axis::Dry], Quadrant::ColdDry, -32, -32),
    ];

    let bank = SurveyVersion::Short.bank();
    for (axes, expected, ch, dd) in cases {
        let answers = fill(SurveyVersion::Short, &axes, 4);
        let result = score(&bank, &answers);
        assert_eq!(result.type_code, expected, "axes {axes:?}");
        assert_eq!((result.ch, result.dd), (ch, dd));
        assert_eq!(result.type_code.profile().code, expected);
    }
}

#[test]
fn mini_bank_ignores_answers_outside_its_questions() {
    let answers = AnswerSet::from_json(&json!({
        "C1": 4, "C2": 4, "C3": 4,
        "C4": 4, "H4": 4,
        "W1": 0
    }))
    .expect("valid answers");

    let mini = score(&SurveyVersion::Mini.bank(), &answers);
    assert_eq!((mini.ch, mini.dd), (-12, 0));
    assert_eq!(mini.type_code, Quadrant::ColdDamp);

    let short = score(&SurveyVersion::Short.bank(), &answers);
    assert_eq!((short.ch, short.dd), (-12, 0));
}

#[test]
fn stored_record_renders_a_shareable_view() {
    let answers = fill(SurveyVersion::Short, &[Axis::Cold], 2);
    let result = score(&SurveyVersion::Short.bank(), &answers);
    assert_eq!((result.ch, result.dd), (-16, 0));

    let created_at = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    let id: SurveyId = "7b0f6f7e-3a55-4c59-9a83-8d4c7a9b2f10"
        .parse()
        .expect("valid uuid");
    let record = SurveyRecord::new(id, SurveyVersion::Short, result, answers, created_at);

    let view = ResultView::from_record(&record, "https://quiz.example/");
    assert_eq!(view.profile.name_en, "Arctic Swamp");
    assert_eq!(view.quadrant_label, "한습");
    assert_eq!(view.coordinates.ch, "-16");
    assert_eq!(view.coordinates.dd, "+0");
    assert_eq!(
        view.share.url,
        "https://quiz.example/r/7b0f6f7e-3a55-4c59-9a83-8d4c7a9b2f10"
    );
    assert!(view.share.caption.contains(view.profile.mission));
    assert_eq!(view.map, MapPosition::project(-16, 0, 32));
    assert!(view.map.x < 150.0);

    let payload = serde_json::to_value(&view).expect("view serializes");
    assert!(payload.get("narrative").is_none());
    assert_eq!(payload["profile"]["code"], "CH");
}

#[test]
fn unrecognised_codes_fall_back_to_fire_desert() {
    assert_eq!(profile::for_code("ZZ").name_en, "Fire Desert");
    assert_eq!(Quadrant::from_code_or_default("??"), Quadrant::HeatDry);
    assert_eq!(profile::for_code("cd").code, Quadrant::ColdDry);
}

#[test]
fn labels_and_percentages_follow_display_rules() {
    assert_eq!(quadrant_label(0, 0), "열습");
    assert_eq!(quadrant_label(-1, -1), "한조");
    assert_eq!(signed(7), "+7");
    assert_eq!(signed(-7), "-7");

    assert_eq!(TypeStatistics::compute(1, 8).percentage, 13);
    assert_eq!(TypeStatistics::compute(0, 0), TypeStatistics::default());
}
