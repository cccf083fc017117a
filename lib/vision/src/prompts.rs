//! Fixed zero-shot prompt banks
//!
//! Each bank is scored as one softmax, so prompts within a bank compete and
//! banks are independent of each other.

/// A named set of competing prompts and how many top labels to report
#[derive(Debug, Clone, Copy)]
pub struct PromptBank {
    pub name: &'static str,
    pub prompts: &'static [&'static str],
    pub top_n: usize,
}

pub const CATEGORY: PromptBank = PromptBank {
    name: "category",
    prompts: &[
        "a photo of a t-shirt",
        "a photo of a dress",
        "a photo of a jacket",
        "a photo of jeans",
        "a photo of a skirt",
        "a photo of a sweater",
        "a photo of a coat",
        "a photo of a blouse",
        "a photo of shorts",
        "a photo of a hoodie",
        "a photo of trousers",
        "a photo of a suit",
        "a photo of a cardigan",
        "a photo of sneakers",
        "a photo of boots",
        "a photo of high heels",
        "a photo of a handbag",
        "a photo of a scarf",
        "a photo of a hat",
        "a photo of a belt",
        "a photo of a swimsuit",
        "a photo of a jumpsuit",
        "a photo of a vest",
        "a photo of sandals",
        "a photo of an athletic top",
        "a photo of athletic leggings",
        "a photo of a denim jacket",
    ],
    top_n: 3,
};

pub const COLOR: PromptBank = PromptBank {
    name: "color",
    prompts: &[
        "black colored clothing",
        "white colored clothing",
        "navy blue colored clothing",
        "red colored clothing",
        "green colored clothing",
        "grey colored clothing",
        "beige colored clothing",
        "brown colored clothing",
        "pink colored clothing",
        "yellow colored clothing",
        "orange colored clothing",
        "purple colored clothing",
        "olive colored clothing",
        "cream colored clothing",
        "burgundy colored clothing",
        "teal colored clothing",
        "multicolored clothing with multiple colors",
    ],
    top_n: 3,
};

pub const MATERIAL: PromptBank = PromptBank {
    name: "material",
    prompts: &[
        "clothing made of cotton fabric",
        "clothing made of denim fabric",
        "clothing made of leather material",
        "clothing made of wool fabric",
        "clothing made of silk fabric",
        "clothing made of polyester fabric",
        "clothing made of linen fabric",
        "clothing made of cashmere fabric",
        "clothing made of velvet fabric",
        "clothing made of suede material",
        "clothing made of nylon fabric",
        "clothing made of knitted fabric",
        "clothing made of chiffon fabric",
        "clothing made of corduroy fabric",
        "clothing made of tweed fabric",
    ],
    top_n: 2,
};

/// Ordered best to worst; the grader maps these 1:1 onto grades A..F
pub const CONDITION: PromptBank = PromptBank {
    name: "condition",
    prompts: &[
        "brand new clothing with tags",
        "like new clothing in excellent condition",
        "gently used clothing in good condition",
        "visibly worn clothing with signs of use",
        "heavily worn damaged clothing",
    ],
    top_n: 1,
};

pub const STYLE: PromptBank = PromptBank {
    name: "style",
    prompts: &[
        "minimalist style",
        "vintage retro style",
        "streetwear style",
        "bohemian style",
        "classic preppy style",
        "athleisure style",
        "avant-garde fashion",
        "casual everyday wear",
        "formal wear",
        "workwear professional",
        "grunge style",
        "cottagecore style",
    ],
    top_n: 2,
};

/// Defect detectors; the last prompt is the "no defect" sink
pub const DEFECT: PromptBank = PromptBank {
    name: "defect",
    prompts: &[
        "clothing with visible stains",
        "clothing with holes or tears",
        "clothing with pilling or fuzz",
        "clothing with fading or discoloration",
        "clothing with loose threads",
        "clothing with missing buttons",
        "clothing with zipper problems",
        "clothing in perfect condition",
    ],
    top_n: 8,
};

const PREFIXES: [&str; 4] = ["a photo of ", "clothing made of ", "an ", "a "];
const SCAFFOLDING: [&str; 5] = [" colored", " clothing", " fabric", " material", " style"];

/// Strip prompt scaffolding, leaving the human-readable label
///
/// `"a photo of an athletic top"` becomes `"athletic top"` and
/// `"navy blue colored clothing"` becomes `"navy blue"`.
pub fn clean_label(prompt: &str) -> String {
    let mut label = prompt;
    for prefix in PREFIXES {
        if let Some(rest) = label.strip_prefix(prefix) {
            label = rest;
        }
    }

    let mut label = label.to_string();
    for token in SCAFFOLDING {
        label = label.replace(token, "");
    }
    label.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_sizes() {
        assert_eq!(CATEGORY.prompts.len(), 27);
        assert_eq!(COLOR.prompts.len(), 17);
        assert_eq!(MATERIAL.prompts.len(), 15);
        assert_eq!(CONDITION.prompts.len(), 5);
        assert_eq!(STYLE.prompts.len(), 12);
        assert_eq!(DEFECT.prompts.len(), 8);
    }

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("a photo of a t-shirt"), "t-shirt");
        assert_eq!(clean_label("a photo of an athletic top"), "athletic top");
        assert_eq!(clean_label("a photo of jeans"), "jeans");
        assert_eq!(clean_label("navy blue colored clothing"), "navy blue");
        assert_eq!(clean_label("clothing made of leather material"), "leather");
        assert_eq!(clean_label("minimalist style"), "minimalist");
        assert_eq!(clean_label("avant-garde fashion"), "avant-garde fashion");
        assert_eq!(clean_label("brand new clothing with tags"), "brand new with tags");
    }

    #[test]
    fn test_labels_are_unique_per_bank() {
        for bank in [CATEGORY, COLOR, MATERIAL, CONDITION, STYLE] {
            let mut labels: Vec<String> = bank.prompts.iter().map(|p| clean_label(p)).collect();
            labels.sort();
            labels.dedup();
            assert_eq!(labels.len(), bank.prompts.len(), "{} bank", bank.name);
        }
    }
}
