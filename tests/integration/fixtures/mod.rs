// Test fixtures with known lexicons and report texts
// WHY: Pipeline assertions need deterministic lexicon/report pairs

/// Target lexicon in tsv form with a header row
pub const TARGETS_TSV: &str = "Lex\tType\tRegex\tDirection
pulmonary embolism\tPULMONARY_EMBOLISM\tpulmonary\\s(artery )?(embol[a-z]+)\t
pneumonia\tPNEUMONIA\t\t
free air\tFREE_AIR\t\t
edema\tEDEMA\t\t
# commented\tIGNORED\t\t
";

/// Modifier lexicon in tsv form with a header row
pub const MODIFIERS_TSV: &str = "Lex\tType\tRegex\tDirection
no\tDEFINITE_NEGATED_EXISTENCE\t\tforward
denies\tDEFINITE_NEGATED_EXISTENCE\t\tforward
no gross evidence of\tPROBABLE_NEGATED_EXISTENCE\t\tforward
ruled out\tDEFINITE_NEGATED_EXISTENCE\t\tbackward
history of\tHISTORICAL\t\tforward
free\tDEFINITE_EXISTENCE\t\tbackward
but\tDEFINITE_NEGATED_EXISTENCE,HISTORICAL\t\tterminate
";

/// Same modifiers as csv, without a regex column on most rows
pub const MODIFIERS_CSV: &str = "Lex,Type,Regex,Direction
no,DEFINITE_NEGATED_EXISTENCE,,forward
ruled out,DEFINITE_NEGATED_EXISTENCE,,backward
";

/// CT angiogram impression from a pulmonary embolism study
pub const PE_IMPRESSION: &str =
    "IMPRESSION: 1. LIMITED STUDY DEMONSTRATING NO GROSS EVIDENCE OF SIGNIFICANT PULMONARY EMBOLISM.";

/// Multi-sentence chest x-ray report
pub const CHEST_REPORT: &str = "No pneumonia but there is edema. \
Pulmonary embolism ruled out. \
Patient has a history of pneumonia. \
There is free air.";
