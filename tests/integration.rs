use aspect_miner::{
    analyze, match_dimension, rank_opportunities, score_dimension, score_dimensions, AnalysisReport, Analyzer, Axis,
    AxisLabel, DataQualityWarning, DimensionScore, LexiconStore, OpportunityOutlook, PersonaTags,
    Review, Sentence, Valence,
};

const SMALL_LEXICON: &str = include_str!("fixtures/small_lexicon.yaml");

fn store() -> LexiconStore {
    LexiconStore::from_yaml_str(SMALL_LEXICON).unwrap()
}

fn repeat(text: &str, polarity: f64, rating: f64, n: usize) -> Vec<Sentence> {
    (0..n).map(|_| Sentence::new(text, polarity, rating)).collect()
}

fn dim<'a>(scores: &'a [DimensionScore], name: &str) -> &'a DimensionScore {
    scores
        .iter()
        .find(|d| d.dimension == name)
        .unwrap_or_else(|| panic!("no score for {name}"))
}

#[test]
fn negated_phrase_in_positive_sentence_is_not_a_pain_point() {
    let store = store();
    let flow = store.dimension("Ink Flow").unwrap();
    let sentences = vec![
        Sentence::new("it does not leak at all", 0.4, 5.0),
        Sentence::new("leaks everywhere, terrible", -0.6, 1.0),
    ];
    let matched = match_dimension(flow, &sentences, store.hyperparameters());
    let leak = matched.tags.iter().find(|t| t.tag == "negative-leak").unwrap();
    assert_eq!(leak.raw_matches, 2, "both sentences contain 'leak'");
    assert_eq!(leak.valid_matches, 1, "only the complaint should count");
    assert_eq!(leak.mean_rating, Some(1.0));
}

#[test]
fn pain_breakdown_lists_only_tags_with_valid_matches() {
    let store = store();
    let hp = store.hyperparameters();
    let flow = store.dimension("Ink Flow").unwrap();
    let sentences = vec![
        Sentence::new("it does not leak at all", 0.4, 5.0),
        Sentence::new("smooth flow", 0.4, 5.0),
    ];
    let matched = match_dimension(flow, &sentences, hp);
    assert_eq!(matched.with_valence(Valence::Negative).count(), 1);

    let score = score_dimension(&matched, sentences.len(), hp);
    assert!(score.pain_breakdown.is_empty());
    assert_eq!(score.pain_summary, "none");
    assert!(rank_opportunities(&[score], 3).is_healthy());
}

#[test]
fn tags_without_phrases_are_skipped() {
    let store = store();
    let flow = store.dimension("Ink Flow").unwrap();
    let matched = match_dimension(flow, &repeat("leak", -1.0, 1.0, 3), store.hyperparameters());
    assert!(matched.tags.iter().all(|t| t.tag != "negative-unused"));
    assert_eq!(matched.tags.len(), 3);
}

#[test]
fn severe_complaints_are_weighted_up() {
    let store = store();
    let hp = store.hyperparameters();
    let flow = store.dimension("Ink Flow").unwrap();

    let severe = repeat("it leaks", -0.5, 1.0, 10);
    let score = score_dimension(&match_dimension(flow, &severe, hp), severe.len(), hp);
    assert_eq!(score.neg_score, 15.0);
    assert_eq!(score.pain_points, 15);

    let mild = repeat("it leaks", -0.5, 3.0, 10);
    let score = score_dimension(&match_dimension(flow, &mild, hp), mild.len(), hp);
    assert_eq!(score.neg_score, 10.0);
}

#[test]
fn weighting_follows_mean_rating_of_valid_matches() {
    let store = store();
    let hp = store.hyperparameters();
    let flow = store.dimension("Ink Flow").unwrap();
    let weight_for = |ratings: &[f64]| {
        let sentences: Vec<Sentence> = ratings
            .iter()
            .map(|&r| Sentence::new("leak", -0.5, r))
            .collect();
        let matched = match_dimension(flow, &sentences, hp);
        matched
            .tags
            .iter()
            .find(|t| t.tag == "negative-leak")
            .map(|t| t.weight)
            .unwrap()
    };
    assert_eq!(weight_for(&[1.5, 2.5]), 1.5);
    assert_eq!(weight_for(&[2.0, 2.5]), 1.0);
    // a high-rated rejected match does not dilute the mean
    let sentences = vec![
        Sentence::new("leak", -0.5, 1.0),
        Sentence::new("no leak", 0.5, 5.0),
    ];
    let matched = match_dimension(flow, &sentences, hp);
    let leak = matched.tags.iter().find(|t| t.tag == "negative-leak").unwrap();
    assert_eq!(leak.valid_matches, 1);
    assert_eq!(leak.weight, 1.5);
}

fn scenario(neg_rating: f64) -> Vec<Sentence> {
    let mut s = repeat("great variety of shades", 0.3, 2.0, 20);
    s.extend(repeat("limited range sadly", -0.3, neg_rating, 5));
    s.extend(repeat("nothing to see here", 0.0, 4.0, 75));
    s
}

#[test]
fn end_to_end_scope_with_severe_complaints() {
    let store = store();
    let sentences = scenario(2.0);
    assert_eq!(sentences.len(), 100);

    let scores = score_dimensions(&store, &sentences);
    let color = dim(&scores, "Color Variety");

    assert_eq!(color.pos_score, 20.0);
    assert_eq!(color.neg_score, 7.5);
    assert_eq!(color.vocal_count, 25);
    assert_eq!(color.satisfaction_pct, 72.7);
    assert_eq!(color.dimension_rating, 2.0);

    let expected_conf = 26f64.ln() / 21f64.ln();
    assert!((color.confidence - expected_conf).abs() < 1e-12);

    let sat = 20.0 / 27.5 * 100.0;
    let expected = 7.5 * (100.0 - sat) * 3.1 / 100.0 * expected_conf;
    assert!(
        (color.opportunity_index - expected).abs() <= 0.005 + 1e-9,
        "got {}, expected about {expected}",
        color.opportunity_index
    );
    assert_eq!(color.pain_summary, "limited-range(5 mentions / 2.0\u{2605})");
}

#[test]
fn end_to_end_scope_with_mild_complaints() {
    let store = store();
    let scores = score_dimensions(&store, &scenario(3.0));
    let color = dim(&scores, "Color Variety");

    assert_eq!(color.neg_score, 5.0);
    assert_eq!(color.satisfaction_pct, 80.0);
    // (20 * 2.0 + 5 * 3.0) / 25
    assert_eq!(color.dimension_rating, 2.2);
    let conf = 26f64.ln() / 21f64.ln();
    let expected = 5.0 * 20.0 * (5.1 - 2.2) / 100.0 * conf;
    assert!((color.opportunity_index - expected).abs() <= 0.005 + 1e-9);
}

#[test]
fn neutral_mentions_feed_volume_but_not_satisfaction() {
    let store = store();
    let mut sentences = repeat("the color range is what it is", -0.9, 1.0, 4);
    sentences.extend(repeat("many colors", 0.5, 5.0, 1));
    let scores = score_dimensions(&store, &sentences);
    let color = dim(&scores, "Color Variety");

    assert_eq!(color.neutral_mentions, 4);
    assert_eq!(color.vocal_count, 5);
    assert_eq!(color.neg_score, 0.0);
    assert_eq!(color.satisfaction_pct, 100.0);
    assert_eq!(color.dimension_rating, 5.0, "neutral ratings stay out of the mean");
}

#[test]
fn empty_scope_scores_zero_and_is_healthy() {
    let store = store();
    let report = Analyzer::new(&store).analyze_scope("empty", &[]);

    assert_eq!(report.sentence_count, 0);
    assert_eq!(report.average_rating, 0.0);
    assert_eq!(report.health_pct, 0.0);
    for d in &report.dimensions {
        assert_eq!(d.pos_score, 0.0);
        assert_eq!(d.neg_score, 0.0);
        assert_eq!(d.satisfaction_pct, 0.0);
        assert_eq!(d.dimension_rating, 0.0);
        assert_eq!(d.confidence, 0.5);
        assert_eq!(d.opportunity_index, 0.0);
        assert_eq!(d.pain_summary, "none");
    }
    assert_eq!(report.opportunities, OpportunityOutlook::Healthy);
}

#[test]
fn praise_only_scope_is_healthy() {
    let store = store();
    let sentences = repeat("smooth flow and many colors", 0.8, 5.0, 12);
    let report = Analyzer::new(&store).analyze_scope("praise", &sentences);
    assert!(report.opportunities.is_healthy());
    assert_eq!(report.health_pct, 100.0);

    let json = serde_json::to_value(&report.opportunities).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[test]
fn opportunities_are_ranked_by_index() {
    let store = store();
    let mut sentences = repeat("it leaks", -0.8, 1.0, 8);
    sentences.extend(repeat("limited range", -0.2, 3.0, 2));
    sentences.extend(repeat("many colors", 0.6, 5.0, 6));
    let report = Analyzer::new(&store).analyze_scope("mixed", &sentences);

    let ranked = report.opportunities.ranked();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].dimension, "Ink Flow");
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].dimension, "Color Variety");
    assert!(ranked[0].opportunity_index >= ranked[1].opportunity_index);
}

#[test]
fn top_k_truncates_ranking() {
    let yaml = format!("{SMALL_LEXICON}\nhyperparameters:\n  top_opportunities: 1\n");
    let store = LexiconStore::from_yaml_str(&yaml).unwrap();
    let mut sentences = repeat("it leaks", -0.8, 1.0, 3);
    sentences.extend(repeat("limited range", -0.8, 1.0, 3));
    let report = Analyzer::new(&store).analyze_scope("k", &sentences);
    assert_eq!(report.opportunities.ranked().len(), 1);
}

#[test]
fn equal_indices_keep_configuration_order() {
    let store = store();
    let mut sentences = repeat("it leaks", -0.8, 1.0, 3);
    sentences.extend(repeat("limited range", -0.8, 1.0, 3));
    let report = Analyzer::new(&store).analyze_scope("tie", &sentences);
    let ranked = report.opportunities.ranked();
    assert_eq!(ranked[0].opportunity_index, ranked[1].opportunity_index);
    assert_eq!(ranked[0].dimension, "Color Variety");
    assert_eq!(ranked[1].dimension, "Ink Flow");
}

#[test]
fn scope_review_count_follows_review_index() {
    let store = store();
    let sentences: Vec<Sentence> = (0..50)
        .map(|i| Sentence::new("many colors", 0.5, 5.0).in_review(i / 5))
        .collect();
    let report = Analyzer::new(&store).analyze_scope("indexed", &sentences);
    assert_eq!(report.review_count, 10);
    assert_eq!(report.sentence_count, 50);

    let unindexed = repeat("many colors", 0.5, 5.0, 50);
    let report = Analyzer::new(&store).analyze_scope("plain", &unindexed);
    assert_eq!(report.review_count, 1, "Sentence::new attributes to review 0");
}

#[test]
fn scoring_is_idempotent() {
    let store = store();
    let sentences = scenario(2.0);
    let first = score_dimensions(&store, &sentences);
    let second = score_dimensions(&store, &sentences);
    assert_eq!(first, second);
}

#[test]
fn persona_axes_are_independent() {
    let store = store();
    let tags = PersonaTags::classify(&store, "bought these for my grandson, he paints rocks");
    assert_eq!(tags.buyer_role, AxisLabel::Labeled("Parent/Gift".into()));
    assert_eq!(tags.gender, AxisLabel::Labeled("Male".into()));
    assert_eq!(tags.age_group, AxisLabel::Labeled("Child".into()));
    assert_eq!(tags.usage_scenario, AxisLabel::Labeled("Rock Painting".into()));
    assert_eq!(tags.purchase_motivation, AxisLabel::Unlabeled);
}

#[test]
fn persona_first_label_wins() {
    let store = store();
    let tags = PersonaTags::classify(&store, "i use them with my students and for my son");
    assert_eq!(tags.get(Axis::BuyerRole).as_str(), "Parent/Gift");
}

#[test]
fn builtin_lexicon_tags_grandparent_gift() {
    let store = LexiconStore::builtin().unwrap();
    let tags = PersonaTags::classify(&store, "got this set for my grandson and he loves it");
    assert_eq!(tags.buyer_role.as_str(), "Parent/Gift");
}

#[test]
fn persona_distribution_excludes_unlabeled() {
    let store = store();
    let sentences = vec![
        Sentence::new("for my son", 0.0, 5.0),
        Sentence::new("for my son again", 0.0, 3.0),
        Sentence::new("my students liked it", 0.0, 4.0),
        Sentence::new("no persona here", 0.0, 1.0),
    ];
    let report = Analyzer::new(&store).analyze_scope("p", &sentences);
    let roles = report
        .personas
        .iter()
        .find(|d| d.axis == Axis::BuyerRole)
        .unwrap();

    assert_eq!(roles.total_rows, 4);
    assert_eq!(roles.labeled_rows, 3);
    assert_eq!(roles.coverage_pct, 75.0);
    assert_eq!(roles.labels[0].label, "Parent/Gift");
    assert_eq!(roles.labels[0].count, 2);
    assert_eq!(roles.labels[0].share_pct, 66.7);
    assert_eq!(roles.labels[0].mean_rating, Some(4.0));
    assert_eq!(roles.labels[1].share_pct, 33.3);
    assert!(roles.labels.iter().all(|l| l.label != "unlabeled"));
}

#[test]
fn persona_usage_cross_tab_needs_both_labels() {
    let store = store();
    let sentences = vec![
        Sentence::new("for my son, he paints rocks", 0.0, 5.0),
        Sentence::new("for my son", 0.0, 4.0),
        Sentence::new("canvas work", 0.0, 2.0),
    ];
    let report = Analyzer::new(&store).analyze_scope("x", &sentences);
    let tab = &report.persona_by_usage;
    assert_eq!(tab.row_axis, Axis::BuyerRole);
    assert_eq!(tab.column_axis, Axis::UsageScenario);
    assert_eq!(tab.cells.len(), 1);
    assert_eq!(tab.cells[0].row, "Parent/Gift");
    assert_eq!(tab.cells[0].column, "Rock Painting");
    assert_eq!(tab.cells[0].count, 1);
}

fn sample_reviews() -> Vec<Review> {
    vec![
        Review::new("Leaks everywhere. Terrible!", 1.0, "kids"),
        Review::new("Great variety. Smooth flow too.", 5.0, "bulk"),
        Review {
            body: None,
            rating: 4.0,
            variant: "kids".into(),
        },
        Review::new("Not enough colors for my son.", 2.0, "kids"),
        Review::new("Fine", 9.0, "bulk"),
    ]
}

#[test]
fn batch_is_grouped_by_variant_in_first_seen_order() {
    let store = store();
    let report = analyze(&store, &sample_reviews());

    let names: Vec<&str> = report.scopes.iter().map(|s| s.scope.as_str()).collect();
    assert_eq!(names, vec!["kids", "bulk"]);
    let kids = report.scope("kids").unwrap();
    assert_eq!(kids.review_count, 3);
    assert_eq!(kids.sentence_count, 3);
    assert_eq!(report.sentences.len(), 5);
    assert!(report
        .sentences
        .iter()
        .all(|row| row.sentence.text == row.sentence.text.to_lowercase()));
}

#[test]
fn bad_reviews_become_warnings_not_failures() {
    let store = store();
    let report = analyze(&store, &sample_reviews());
    assert!(report
        .warnings
        .contains(&DataQualityWarning::MissingBody { review_index: 2 }));
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        DataQualityWarning::InvalidRating {
            review_index: 4,
            ..
        }
    )));
    let kids = report.scope("kids").unwrap();
    let flow = dim(&kids.dimensions, "Ink Flow");
    assert_eq!(flow.pain_points, 1);
}

#[test]
fn scope_with_only_bad_reviews_is_flagged_empty() {
    let store = store();
    let reviews = vec![Review {
        body: None,
        rating: 3.0,
        variant: "ghost".into(),
    }];
    let report = analyze(&store, &reviews);
    assert!(report.warnings.contains(&DataQualityWarning::EmptyScope {
        scope: "ghost".into()
    }));
    assert!(report.scope("ghost").unwrap().opportunities.is_healthy());
}

#[test]
fn pain_evidence_quotes_low_rated_sentences_once() {
    let store = store();
    let sentences = vec![
        Sentence::new("it leaks", -0.5, 1.0),
        Sentence::new("it leaks", -0.5, 1.0),
        Sentence::new("it leaks", -0.5, 2.0),
        Sentence::new("does not leak at all", 0.5, 5.0),
        Sentence::new("smooth flow", 0.5, 2.0),
    ];
    let analyzer = Analyzer::new(&store);
    let evidence = analyzer.pain_evidence("Ink Flow", &sentences).unwrap();
    assert_eq!(evidence.len(), 2);
    assert_eq!(evidence[0].rating, 1.0);
    assert_eq!(evidence[1].rating, 2.0);
    assert!(analyzer.pain_evidence("Unknown", &sentences).is_none());
}

#[test]
fn curly_apostrophe_negation_does_not_count_as_praise() {
    let store = store();
    for body in ["It isn't a smooth flow.", "It isn\u{2019}t a smooth flow."] {
        let report = analyze(&store, &[Review::new(body, 2.0, "v")]);
        let flow = dim(&report.scopes[0].dimensions, "Ink Flow");
        assert_eq!(flow.highlights, 0, "negated praise counted for {body:?}");
        assert!(report.sentences[0].sentence.polarity < 0.0);
    }
}

#[test]
fn custom_polarity_scorer_is_used() {
    let store = store();
    let always_happy = |_: &str| 0.9;
    let reviews = vec![Review::new("it does not leak", 5.0, "v")];
    let report = Analyzer::with_scorer(&store, &always_happy).analyze(&reviews);
    assert_eq!(report.sentences[0].sentence.polarity, 0.9);
    let flow = dim(&report.scopes[0].dimensions, "Ink Flow");
    assert_eq!(flow.neg_score, 0.0);
}

#[test]
fn json_output_is_valid() {
    let store = store();
    let report: AnalysisReport = analyze(&store, &sample_reviews());
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let scope = &parsed["scopes"][0];
    for key in [
        "scope",
        "review_count",
        "sentence_count",
        "average_rating",
        "health_pct",
        "dimensions",
        "opportunities",
        "personas",
        "persona_by_usage",
    ] {
        assert!(scope.get(key).is_some(), "missing scope key {key}");
    }
    let row = &parsed["sentences"][0];
    for key in ["scope", "text", "polarity", "rating", "buyer_role", "usage_scenario"] {
        assert!(row.get(key).is_some(), "missing sentence key {key}");
    }
    assert_eq!(parsed["warnings"][0]["kind"], "missing_body");
}

#[test]
fn valence_is_resolved_at_load_time() {
    let store = store();
    let color = store.dimension("Color Variety").unwrap();
    let valences: Vec<Valence> = color.tags().iter().map(|t| t.valence()).collect();
    assert_eq!(
        valences,
        vec![Valence::Positive, Valence::Negative, Valence::Neutral]
    );
    assert_eq!(color.tags()[1].suffix(), "limited-range");
}
