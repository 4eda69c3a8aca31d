//! English to Spanish disease-name lookup.
//!
//! The table is ordered: when a name partially matches several entries, the
//! entry listed first wins. General terms ("diabetes", "cancer", "pain") sit at
//! the top on purpose, so "gestational diabetes" becomes "diabetes" rather than
//! falling through to a later, more specific entry.

/// Curated English (lowercase) to Spanish disease names, in lookup order.
pub const TRANSLATIONS: &[(&str, &str)] = &[
    // Common diseases
    ("diabetes", "diabetes"),
    ("hypertension", "hipertensión"),
    ("asthma", "asma"),
    ("depression", "depresión"),
    ("anxiety", "ansiedad"),
    ("cancer", "cáncer"),
    ("arthritis", "artritis"),
    ("migraine", "migraña"),
    ("pneumonia", "neumonía"),
    ("bronchitis", "bronquitis"),
    ("stroke", "accidente cerebrovascular"),
    ("epilepsy", "epilepsia"),
    ("osteoporosis", "osteoporosis"),
    ("anemia", "anemia"),
    ("infection", "infección"),
    ("inflammation", "inflamación"),
    ("pain", "dolor"),
    ("fever", "fiebre"),
    ("allergy", "alergia"),
    ("heart disease", "enfermedad cardíaca"),
    ("kidney disease", "enfermedad renal"),
    ("liver disease", "enfermedad hepática"),
    // Specific conditions
    ("abdominal aortic aneurysm", "aneurisma aórtico abdominal"),
    ("absence seizure", "crisis de ausencia"),
    ("acanthosis nigricans", "acantosis nigricans"),
    ("achalasia", "acalasia"),
    ("achilles tendinitis", "tendinitis de aquiles"),
    ("achilles tendon rupture", "ruptura del tendón de aquiles"),
    ("acl injury", "lesión del ligamento cruzado anterior"),
    ("acne", "acné"),
    ("acoustic neuroma", "neuroma acústico"),
    ("acute coronary syndrome", "síndrome coronario agudo"),
    ("acute kidney injury", "lesión renal aguda"),
    ("acute liver failure", "insuficiencia hepática aguda"),
    ("addison's disease", "enfermedad de addison"),
    ("alzheimer's disease", "enfermedad de alzheimer"),
    ("angina", "angina de pecho"),
    ("appendicitis", "apendicitis"),
    ("atrial fibrillation", "fibrilación auricular"),
    ("autism spectrum disorder", "trastorno del espectro autista"),
    ("back pain", "dolor de espalda"),
    ("bipolar disorder", "trastorno bipolar"),
    ("bladder cancer", "cáncer de vejiga"),
    ("blood clot", "coágulo sanguíneo"),
    ("bone cancer", "cáncer de hueso"),
    ("brain tumor", "tumor cerebral"),
    ("breast cancer", "cáncer de mama"),
    ("broken bone", "hueso roto"),
    ("cataracts", "cataratas"),
    ("cerebral palsy", "parálisis cerebral"),
    ("chest pain", "dolor en el pecho"),
    ("chronic fatigue", "fatiga crónica"),
    ("chronic pain", "dolor crónico"),
    ("colon cancer", "cáncer de colon"),
    ("common cold", "resfriado común"),
    ("constipation", "estreñimiento"),
    ("crohn's disease", "enfermedad de crohn"),
    ("cystic fibrosis", "fibrosis quística"),
    ("dementia", "demencia"),
    ("diarrhea", "diarrea"),
    ("eating disorder", "trastorno alimentario"),
    ("eczema", "eccema"),
    ("endometriosis", "endometriosis"),
    ("gallstones", "cálculos biliares"),
    ("gastroesophageal reflux", "reflujo gastroesofágico"),
    ("glaucoma", "glaucoma"),
    ("gout", "gota"),
    ("hashimoto's disease", "enfermedad de hashimoto"),
    ("heart attack", "infarto"),
    ("heart failure", "insuficiencia cardíaca"),
    ("hemorrhoids", "hemorroides"),
    ("hepatitis", "hepatitis"),
    ("high blood pressure", "presión arterial alta"),
    ("high cholesterol", "colesterol alto"),
    ("hiv/aids", "vih/sida"),
    ("huntington's disease", "enfermedad de huntington"),
    ("hypothyroidism", "hipotiroidismo"),
    ("inflammatory bowel disease", "enfermedad inflamatoria intestinal"),
    ("insomnia", "insomnio"),
    ("irritable bowel syndrome", "síndrome del intestino irritable"),
    ("kidney stones", "cálculos renales"),
    ("leukemia", "leucemia"),
    ("lung cancer", "cáncer de pulmón"),
    ("lupus", "lupus"),
    ("lyme disease", "enfermedad de lyme"),
    ("multiple sclerosis", "esclerosis múltiple"),
    ("obesity", "obesidad"),
    ("parkinson's disease", "enfermedad de parkinson"),
    ("prostate cancer", "cáncer de próstata"),
    ("psoriasis", "psoriasis"),
    ("rheumatoid arthritis", "artritis reumatoide"),
    ("schizophrenia", "esquizofrenia"),
    ("scoliosis", "escoliosis"),
    ("skin cancer", "cáncer de piel"),
    ("sleep apnea", "apnea del sueño"),
    ("stomach cancer", "cáncer de estómago"),
    ("thyroid cancer", "cáncer de tiroides"),
    ("tuberculosis", "tuberculosis"),
    ("type 1 diabetes", "diabetes tipo 1"),
    ("type 2 diabetes", "diabetes tipo 2"),
    ("ulcerative colitis", "colitis ulcerosa"),
    ("urinary tract infection", "infección del tracto urinario"),
];

/// Spanish name from the built-in table, or `english_name` unchanged.
///
/// ```
/// use diseasematcher::translate::translate;
///
/// assert_eq!(translate("Obesity"), "obesidad");
/// assert_eq!(translate("unknown xyz disease"), "unknown xyz disease");
/// ```
pub fn translate(english_name: &str) -> String {
    translate_with(TRANSLATIONS, english_name)
}

/// Lookup against an arbitrary ordered table of lowercase English keys.
pub fn translate_with(table: &[(&str, &str)], english_name: &str) -> String {
    let key = english_name.trim().to_lowercase();

    if let Some((_, spanish)) = table.iter().find(|(english, _)| *english == key) {
        return (*spanish).to_string();
    }

    // An empty key is contained in every entry; keep the name instead.
    if !key.is_empty() {
        if let Some((_, spanish)) = table
            .iter()
            .find(|(english, _)| key.contains(english) || english.contains(key.as_str()))
        {
            return (*spanish).to_string();
        }
    }

    english_name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_hit_is_case_insensitive() {
        assert_eq!(translate("Obesity"), "obesidad");
        assert_eq!(translate("  Type 2 Diabetes "), "diabetes tipo 2");
        assert_eq!(translate("Alzheimer's disease"), "enfermedad de alzheimer");
    }

    #[test]
    fn unknown_names_pass_through_unchanged() {
        assert_eq!(translate("unknown xyz disease"), "unknown xyz disease");
        assert_eq!(translate("Zika Virus"), "Zika Virus");
    }

    #[test]
    fn partial_match_takes_first_listed_entry() {
        // Contains both "diabetes" and "kidney disease"; "diabetes" is listed first.
        assert_eq!(translate("Diabetic kidney disease and diabetes"), "diabetes");
        // "cancer" precedes "lung cancer" in the table.
        assert_eq!(translate("Small cell lung cancer"), "cáncer");
    }

    #[test]
    fn partial_match_works_in_both_directions() {
        // The input is contained in an entry key.
        assert_eq!(translate("Sclerosis"), "esclerosis múltiple");
    }

    #[test]
    fn custom_table_respects_order() {
        let table = [("flu", "gripe"), ("stomach flu", "gastroenteritis")];
        assert_eq!(translate_with(&table, "Stomach flu"), "gastroenteritis");
        assert_eq!(translate_with(&table, "Avian flu"), "gripe");
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(translate(""), "");
    }
}
