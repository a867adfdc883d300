//! Tag registry
//!
//! Every YAML tag the loader accepts is listed here with the category of
//! slot it may fill and the parameters it takes. The registry only checks
//! structure; defaults and value types live with the typed schema in
//! [`crate::manifest`].

use std::fmt;

/// Tag that may stand in for a node of any category.
pub const LOAD_SERIALIZED: &str = "LoadSerialized";

/// Kind of slot a tagged node may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Experiment,
    ExpGlobal,
    Model,
    Reader,
    Vocab,
    Embedder,
    Transducer,
    Attender,
    Decoder,
    Mlp,
    Bridge,
    Regimen,
    Batcher,
    Trainer,
    LossCalculator,
    EvalTask,
    Inference,
    SearchStrategy,
    LengthNormalization,
}

impl Category {
    /// Fixed categories have exactly one type, so their tag is optional and
    /// is dropped before typed decoding.
    pub fn fixed_tag(self) -> Option<&'static str> {
        match self {
            Category::Experiment => Some("Experiment"),
            Category::ExpGlobal => Some("ExpGlobal"),
            Category::Vocab => Some("Vocab"),
            Category::Mlp => Some("MLP"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Experiment => "experiment",
            Category::ExpGlobal => "global settings block",
            Category::Model => "model",
            Category::Reader => "input reader",
            Category::Vocab => "vocabulary",
            Category::Embedder => "embedder",
            Category::Transducer => "sequence transducer",
            Category::Attender => "attender",
            Category::Decoder => "decoder",
            Category::Mlp => "MLP",
            Category::Bridge => "bridge",
            Category::Regimen => "training regimen",
            Category::Batcher => "batcher",
            Category::Trainer => "trainer",
            Category::LossCalculator => "loss calculator",
            Category::EvalTask => "evaluation task",
            Category::Inference => "inference",
            Category::SearchStrategy => "search strategy",
            Category::LengthNormalization => "length normalization",
        };
        f.write_str(name)
    }
}

/// What a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Plain YAML data: scalars, lists and maps without tags.
    Value,
    /// A single node of the category.
    One(Category),
    /// A sequence of nodes of the category.
    Many(Category),
}

/// One keyword parameter of a tag.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub slot: Slot,
    pub required: bool,
}

/// A configurable type.
#[derive(Debug, Clone, Copy)]
pub struct TagSpec {
    pub tag: &'static str,
    pub category: Category,
    pub params: &'static [ParamSpec],
}

impl TagSpec {
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

const fn value(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        slot: Slot::Value,
        required: false,
    }
}

const fn required(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        slot: Slot::Value,
        required: true,
    }
}

const fn one(name: &'static str, category: Category) -> ParamSpec {
    ParamSpec {
        name,
        slot: Slot::One(category),
        required: false,
    }
}

const fn one_required(name: &'static str, category: Category) -> ParamSpec {
    ParamSpec {
        name,
        slot: Slot::One(category),
        required: true,
    }
}

const fn many(name: &'static str, category: Category) -> ParamSpec {
    ParamSpec {
        name,
        slot: Slot::Many(category),
        required: false,
    }
}

const BATCHER_PARAMS: &[ParamSpec] = &[value("batch_size")];
const BRIDGE_PARAMS: &[ParamSpec] = &[value("dec_layers"), value("dec_dim")];
const NO_PARAMS: &[ParamSpec] = &[];

/// All known tags.
pub static TAGS: &[TagSpec] = &[
    TagSpec {
        tag: "Experiment",
        category: Category::Experiment,
        params: &[
            one("exp_global", Category::ExpGlobal),
            one_required("model", Category::Model),
            one_required("train", Category::Regimen),
            many("evaluate", Category::EvalTask),
        ],
    },
    TagSpec {
        tag: "ExpGlobal",
        category: Category::ExpGlobal,
        params: &[
            value("model_file"),
            value("log_file"),
            value("dropout"),
            value("weight_noise"),
            value("default_layer_dim"),
            value("save_num_checkpoints"),
            value("loss_comb_method"),
            value("compute_report"),
            value("placeholders"),
        ],
    },
    TagSpec {
        tag: "DefaultTranslator",
        category: Category::Model,
        params: &[
            one_required("src_reader", Category::Reader),
            one_required("trg_reader", Category::Reader),
            one("src_embedder", Category::Embedder),
            one("encoder", Category::Transducer),
            one("attender", Category::Attender),
            one("trg_embedder", Category::Embedder),
            one("decoder", Category::Decoder),
            one("inference", Category::Inference),
        ],
    },
    TagSpec {
        tag: "PlainTextReader",
        category: Category::Reader,
        params: &[one("vocab", Category::Vocab), value("max_num_sents")],
    },
    TagSpec {
        tag: "Vocab",
        category: Category::Vocab,
        params: &[value("i2w"), value("vocab_file")],
    },
    TagSpec {
        tag: "SimpleWordEmbedder",
        category: Category::Embedder,
        params: &[
            value("emb_dim"),
            value("weight_noise"),
            value("word_dropout"),
            value("fix_norm"),
            value("vocab_size"),
        ],
    },
    TagSpec {
        tag: "BiLSTMSeqTransducer",
        category: Category::Transducer,
        params: &[
            value("layers"),
            value("input_dim"),
            value("hidden_dim"),
            value("dropout"),
            value("weightnoise_std"),
        ],
    },
    TagSpec {
        tag: "UniLSTMSeqTransducer",
        category: Category::Transducer,
        params: &[
            value("layers"),
            value("input_dim"),
            value("hidden_dim"),
            value("dropout"),
            value("weightnoise_std"),
            value("decoder_input_dim"),
            value("decoder_input_feeding"),
        ],
    },
    TagSpec {
        tag: "ModularSeqTransducer",
        category: Category::Transducer,
        params: &[value("input_dim"), many("modules", Category::Transducer)],
    },
    TagSpec {
        tag: "MlpAttender",
        category: Category::Attender,
        params: &[value("input_dim"), value("state_dim"), value("hidden_dim")],
    },
    TagSpec {
        tag: "DotAttender",
        category: Category::Attender,
        params: &[value("scale")],
    },
    TagSpec {
        tag: "MlpSoftmaxDecoder",
        category: Category::Decoder,
        params: &[
            value("input_dim"),
            value("trg_embed_dim"),
            value("input_feeding"),
            one("rnn_layer", Category::Transducer),
            one("mlp_layer", Category::Mlp),
            one("bridge", Category::Bridge),
            value("label_smoothing"),
        ],
    },
    TagSpec {
        tag: "MLP",
        category: Category::Mlp,
        params: &[
            value("input_dim"),
            value("hidden_dim"),
            value("output_dim"),
            value("activation"),
        ],
    },
    TagSpec {
        tag: "NoBridge",
        category: Category::Bridge,
        params: BRIDGE_PARAMS,
    },
    TagSpec {
        tag: "CopyBridge",
        category: Category::Bridge,
        params: BRIDGE_PARAMS,
    },
    TagSpec {
        tag: "LinearBridge",
        category: Category::Bridge,
        params: &[value("dec_layers"), value("enc_dim"), value("dec_dim")],
    },
    TagSpec {
        tag: "SimpleTrainingRegimen",
        category: Category::Regimen,
        params: &[
            required("src_file"),
            required("trg_file"),
            value("run_for_epochs"),
            value("dev_every"),
            one("batcher", Category::Batcher),
            one("loss_calculator", Category::LossCalculator),
            one("trainer", Category::Trainer),
            value("lr_decay"),
            value("lr_decay_times"),
            value("patience"),
            value("initial_patience"),
            many("dev_tasks", Category::EvalTask),
            value("restart_trainer"),
            value("max_num_train_sents"),
            value("max_src_len"),
            value("max_trg_len"),
            value("name"),
        ],
    },
    TagSpec {
        tag: "SrcBatcher",
        category: Category::Batcher,
        params: BATCHER_PARAMS,
    },
    TagSpec {
        tag: "TrgBatcher",
        category: Category::Batcher,
        params: BATCHER_PARAMS,
    },
    TagSpec {
        tag: "InOrderBatcher",
        category: Category::Batcher,
        params: BATCHER_PARAMS,
    },
    TagSpec {
        tag: "AdamTrainer",
        category: Category::Trainer,
        params: &[
            value("alpha"),
            value("beta_1"),
            value("beta_2"),
            value("eps"),
            value("update_every"),
            value("skip_noisy"),
        ],
    },
    TagSpec {
        tag: "SimpleSGDTrainer",
        category: Category::Trainer,
        params: &[value("e0"), value("update_every"), value("skip_noisy")],
    },
    TagSpec {
        tag: "MLELoss",
        category: Category::LossCalculator,
        params: NO_PARAMS,
    },
    TagSpec {
        tag: "MinRiskLoss",
        category: Category::LossCalculator,
        params: &[
            value("alpha"),
            value("inv_eval"),
            value("unique_sample"),
            one("search_strategy", Category::SearchStrategy),
        ],
    },
    TagSpec {
        tag: "LossEvalTask",
        category: Category::EvalTask,
        params: &[
            required("src_file"),
            required("ref_file"),
            one("batcher", Category::Batcher),
            one("loss_calculator", Category::LossCalculator),
            value("max_src_len"),
            value("max_trg_len"),
            value("max_num_sents"),
            value("desc"),
        ],
    },
    TagSpec {
        tag: "AccuracyEvalTask",
        category: Category::EvalTask,
        params: &[
            value("eval_metrics"),
            required("src_file"),
            required("ref_file"),
            required("hyp_file"),
            one("inference", Category::Inference),
            value("desc"),
        ],
    },
    TagSpec {
        tag: "SimpleInference",
        category: Category::Inference,
        params: &[
            value("src_file"),
            value("trg_file"),
            value("ref_file"),
            value("max_src_len"),
            value("max_len"),
            value("post_process"),
            value("report_path"),
            value("report_type"),
            one("search_strategy", Category::SearchStrategy),
            value("mode"),
        ],
    },
    TagSpec {
        tag: "BeamSearch",
        category: Category::SearchStrategy,
        params: &[
            value("beam_size"),
            value("max_len"),
            one("len_norm", Category::LengthNormalization),
            value("one_best"),
        ],
    },
    TagSpec {
        tag: "GreedySearch",
        category: Category::SearchStrategy,
        params: &[value("max_len")],
    },
    TagSpec {
        tag: "SamplingSearch",
        category: Category::SearchStrategy,
        params: &[value("max_len"), value("max_length"), value("sample_size")],
    },
    TagSpec {
        tag: "NoNormalization",
        category: Category::LengthNormalization,
        params: NO_PARAMS,
    },
    TagSpec {
        tag: "PolynomialNormalization",
        category: Category::LengthNormalization,
        params: &[value("m"), value("apply_during_search")],
    },
];

/// Find a tag's spec by name (without the `!`).
pub fn lookup(tag: &str) -> Option<&'static TagSpec> {
    TAGS.iter().find(|spec| spec.tag == tag)
}

/// Spec of the single type of a fixed category.
pub fn fixed_spec(category: Category) -> Option<&'static TagSpec> {
    category.fixed_tag().and_then(lookup)
}
