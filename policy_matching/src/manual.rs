/*!

This is the long-form manual for `policy_matching` and `polmatch`.

## Scoring

### Candidate matches

Each question has a weight: 2 if its category is one of the priority categories
selected by the user, 1 otherwise. For every selected option, each candidate
supporting that option receives the weight of the question.

The match percentage of a candidate is its share of all the points given out:

```text
matchPercentage = round(candidatePoints / sum(allCandidatePoints) * 100)
```

It is 0 for everyone when no point was given (nothing answered, or only options
that no candidate supports). Rounding is always half up: 12.5 becomes 13.

The `totalPossiblePoints` reported for each candidate counts every option
supporting that candidate, selected or not, on all the questions. It is only
meant for display and does not enter the percentage.

Candidates with the same percentage keep the order of the dataset
(`useCandidateOrder`), or are ordered by their raw points first
(`matchingPoints`).

### Target alignment

The target alignment measures how closely the answers follow one candidate.
With N questions in the dataset, each question is worth `100 / N`:

| user selections among the options of the target | credit |
|---|---|
| none (or question skipped) | 0 |
| only options supported by the target alone | full |
| at least one option shared with other candidates | half, full if the question is in a priority category |

Selecting only options supported by the target alone on every question gives 100.

### Alignments and divergences

For every answered question on which the target supports at least one option:
- if the user picked one of these options, the question is an *alignment*. It
  lists the picked options and the other options of the target.
- otherwise it is a *divergence*. It lists what the user picked and all the
  options of the target, with their explanations.

An option shared by the target and other candidates is still an option of the
target. With option A supported by `C1` and option B supported by `C1` and `C2`,
a user picking only A gets an alignment on `C1` with B listed in
`otherTargetOptions`.

## Outputs

The result is a JSON object with camelCase keys. In each entry of
`candidateMatches`, `candidate` is the candidate id and `name` its display
name (the `candidateId` and `displayName` of other descriptions of the quiz).

## Inputs

### Dataset

The dataset is a JSON file:

```json
{
  "targetCandidate": "Mussab Ali",
  "rules": { "tiebreakMode": "useCandidateOrder", "maxPriorityCategories": 3 },
  "candidates": [
    {
      "id": "Mussab Ali",
      "name": "Mussab Ali",
      "imageUrl": "https://example.org/ali.png",
      "website": "https://mussabali.com",
      "bio": "Community organizer.",
      "socialMedia": { "twitter": "https://twitter.com/mussabali" }
    }
  ],
  "categories": [
    {
      "id": "transportation",
      "name": "Transportation & Street Design",
      "description": "How residents move around the city",
      "aliases": ["Transportation"]
    }
  ],
  "questions": [
    {
      "id": 0,
      "subtopic": "Street Usage",
      "question": "How should the city balance its streets?",
      "category": "transportation",
      "options": [
        {
          "text": "Protected bike lanes",
          "candidates": ["Mussab Ali"],
          "explanations": [
            { "candidate": "Mussab Ali", "explanation": "...", "source": "Platform" }
          ]
        }
      ]
    }
  ]
}
```

Notes:
- question ids must be 0, 1, 2... in the order of the file
- every question belongs to exactly one category, given by its `category` field.
  The list of questions of a category is derived from it.
- `aliases` are the other labels accepted for a category, for example the labels
  stored by previous versions of the quiz. Ids, names and aliases are matched
  without case.
- `rules` and `targetCandidate` are optional. In `rules`, `priorityWeight` (default 2)
  must be between 1 and 1000, and `maxPriorityCategories` can only lower the
  limit of 3 priority categories.

### Answers

`json`: the selected option indices (starting at 0) for each question id. A bare
number is accepted for a single selection. Missing questions or empty lists are
skipped questions.

```json
{ "answers": { "0": [0, 2], "1": 3, "4": [] }, "selectedCategories": ["housing"] }
```

`csv`: one row per selection, with an optional header.

```text
question_id,option_index
0,0
0,2
1,3
4,
```

Indices beyond the options of a question are ignored.

 */
