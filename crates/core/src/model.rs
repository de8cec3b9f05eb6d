use crate::classifier::SgdClassifier;
use crate::config::{ClassifierConfig, VectorizerConfig};
use crate::error::ModelError;
use crate::vectorizer::NgramVectorizer;
use storage::{Store, TrainingCorpus};

/// Fitted classifier together with the vectorizer it was trained against.
#[derive(Debug, Clone)]
pub struct Model {
    pub classifier: SgdClassifier,
    pub vectorizer: NgramVectorizer,
}

impl Model {
    /// Fits a fresh vectorizer and classifier on the whole corpus.
    pub fn fit(
        corpus: &TrainingCorpus,
        vectorizer_cfg: &VectorizerConfig,
        classifier_cfg: &ClassifierConfig,
    ) -> Result<Self, ModelError> {
        if corpus.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let vectorizer = NgramVectorizer::fit(&corpus.file_names, vectorizer_cfg)?;
        let samples = vectorizer.transform_all(&corpus.file_names);
        let classifier = SgdClassifier::fit(
            &samples,
            &corpus.folder_labels,
            vectorizer.n_features(),
            classifier_cfg,
        )?;
        Ok(Self {
            classifier,
            vectorizer,
        })
    }

    pub fn predict(&self, file_name: &str) -> &str {
        self.classifier.predict(&self.vectorizer.transform(file_name))
    }

    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn load(store: &Store) -> anyhow::Result<Option<Self>> {
        Ok(store
            .load_model::<SgdClassifier, NgramVectorizer>()?
            .map(|(classifier, vectorizer)| Self {
                classifier,
                vectorizer,
            }))
    }

    pub fn save(&self, store: &Store) -> anyhow::Result<()> {
        store.save_model(&self.classifier, &self.vectorizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reloaded_model_predicts_the_same() {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::open(temp.path());
        let mut corpus = TrainingCorpus::new();
        for name in ["invoice_2021.pdf", "invoice_2022.pdf", "tax_return.pdf"] {
            corpus.push(name, "finance");
        }
        for name in ["beach.jpg", "sunset.jpg", "family.png"] {
            corpus.push(name, "pictures");
        }
        let model = Model::fit(
            &corpus,
            &VectorizerConfig::default(),
            &ClassifierConfig::default(),
        )
        .unwrap();
        model.save(&store).unwrap();

        let loaded = Model::load(&store).unwrap().unwrap();
        assert_eq!(loaded.classes(), model.classes());
        for name in ["invoice_2023.pdf", "mountain.jpg", "notes"] {
            assert_eq!(loaded.predict(name), model.predict(name));
        }
    }
}
